//! Engine state.
//!
//! All mutable bookkeeping of the engine lives in one explicit struct
//! rather than being scattered across a type hierarchy: the window of
//! attached slots, the selection state machine's fields, data-change sync
//! state and the pending layout intent.

use super::intent::LayoutIntent;
use super::slot::Slot;
use super::NO_POSITION;

/// How the sync target recorded at data-change time was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncMode {
    /// Re-find the selected row.
    Selection,
    /// Re-anchor at the first visible row.
    FirstVisible,
}

/// The ordered window of attached slots plus selection, sync and intent
/// bookkeeping.
///
/// Invariant: attached slots cover a contiguous, increasing position run,
/// `slots[i].position == first_position + i`.
#[derive(Debug)]
pub(crate) struct EngineState {
    /// Attached slots, leftmost first.
    pub(crate) slots: Vec<Slot>,
    /// Position of the leftmost attached slot.
    pub(crate) first_position: i32,

    /// Item count recorded at the last processed change.
    pub(crate) item_count: i32,
    /// Item count before the pending change notification.
    pub(crate) old_item_count: i32,

    /// The committed selection, or [`NO_POSITION`].
    pub(crate) selected_position: i32,
    /// Cached stable id of the committed selection.
    pub(crate) selected_id: i64,
    /// The selection the next layout pass should commit.
    pub(crate) next_selected_position: i32,
    /// Cached stable id of the pending selection.
    pub(crate) next_selected_id: i64,
    /// Left edge of the selected slot after the last pass.
    pub(crate) selected_left: i32,

    /// Selection last delivered through the selection-changed signal.
    pub(crate) old_selected_position: i32,
    /// Stable id last delivered through the selection-changed signal.
    pub(crate) old_selected_id: i64,

    /// Whether a change notification is awaiting its layout pass.
    pub(crate) data_changed: bool,
    /// Whether sync bookkeeping below is valid.
    pub(crate) need_sync: bool,
    /// How the sync target was chosen.
    pub(crate) sync_mode: SyncMode,
    /// Position remembered at change time.
    pub(crate) sync_position: i32,
    /// Stable id remembered at change time.
    pub(crate) sync_id: i64,
    /// Left edge remembered at change time.
    pub(crate) sync_left: i32,

    /// The pending layout intent.
    pub(crate) intent: LayoutIntent,

    /// Layout needs to run.
    pub(crate) layout_dirty: bool,
    /// A layout pass is running; nested requests are deferred.
    pub(crate) in_layout: bool,
    /// A nested layout request arrived during the current pass.
    pub(crate) deferred_layout: bool,

    /// Visible range last delivered through the range-changed signal.
    pub(crate) last_notified_range: Option<(i32, i32)>,

    /// Monotonic source for slot identities.
    pub(crate) next_slot_id: u64,
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineState {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_position: 0,
            item_count: 0,
            old_item_count: 0,
            selected_position: NO_POSITION,
            selected_id: i64::MIN,
            next_selected_position: NO_POSITION,
            next_selected_id: i64::MIN,
            selected_left: 0,
            old_selected_position: NO_POSITION,
            old_selected_id: i64::MIN,
            data_changed: false,
            need_sync: false,
            sync_mode: SyncMode::Selection,
            sync_position: NO_POSITION,
            sync_id: i64::MIN,
            sync_left: 0,
            intent: LayoutIntent::None,
            layout_dirty: false,
            in_layout: false,
            deferred_layout: false,
            last_notified_range: None,
            next_slot_id: 0,
        }
    }

    /// Number of attached slots.
    #[inline]
    pub(crate) fn window_len(&self) -> i32 {
        self.slots.len() as i32
    }

    /// Position of the rightmost attached slot, or [`NO_POSITION`] when
    /// the window is empty.
    #[inline]
    pub(crate) fn last_position(&self) -> i32 {
        if self.slots.is_empty() {
            NO_POSITION
        } else {
            self.first_position + self.window_len() - 1
        }
    }

    /// The attached slot bound to `position`, if it is in the window.
    pub(crate) fn window_slot(&self, position: i32) -> Option<&Slot> {
        let index = position - self.first_position;
        if position >= self.first_position && index < self.window_len() {
            self.slots.get(index as usize)
        } else {
            None
        }
    }

    /// Mutable access to the attached slot bound to `position`.
    pub(crate) fn window_slot_mut(&mut self, position: i32) -> Option<&mut Slot> {
        let index = position - self.first_position;
        if position >= self.first_position && index < self.window_len() {
            self.slots.get_mut(index as usize)
        } else {
            None
        }
    }

    /// Shifts every attached slot by `delta` pixels.
    pub(crate) fn offset_window(&mut self, delta: i32) {
        for slot in &mut self.slots {
            slot.offset(delta);
        }
    }

    /// The current visible range `(first, last)`, or `None` when empty.
    pub(crate) fn visible_range(&self) -> Option<(i32, i32)> {
        if self.slots.is_empty() {
            None
        } else {
            Some((self.first_position, self.last_position()))
        }
    }

    /// Asserts the window contiguity invariant in debug builds.
    pub(crate) fn debug_check_window(&self) {
        #[cfg(debug_assertions)]
        for (i, slot) in self.slots.iter().enumerate() {
            debug_assert_eq!(
                slot.position,
                self.first_position + i as i32,
                "window positions must be contiguous from first_position"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::KindId;
    use crate::strip::slot::SlotId;

    fn state_with_window(first: i32, widths: &[i32]) -> EngineState {
        let mut state = EngineState::new();
        state.first_position = first;
        let mut left = 0;
        for (i, &w) in widths.iter().enumerate() {
            let mut slot = Slot::new(SlotId(i as u64), first + i as i32, KindId::DEFAULT);
            slot.left = left;
            slot.right = left + w;
            left += w;
            state.slots.push(slot);
        }
        state
    }

    #[test]
    fn test_window_lookup() {
        let state = state_with_window(5, &[100, 100, 100]);
        assert_eq!(state.window_len(), 3);
        assert_eq!(state.last_position(), 7);
        assert_eq!(state.window_slot(6).unwrap().left, 100);
        assert!(state.window_slot(4).is_none());
        assert!(state.window_slot(8).is_none());
        state.debug_check_window();
    }

    #[test]
    fn test_offset_window() {
        let mut state = state_with_window(0, &[50, 50]);
        state.offset_window(-20);
        assert_eq!(state.slots[0].left, -20);
        assert_eq!(state.slots[1].right, 80);
    }

    #[test]
    fn test_visible_range() {
        assert_eq!(EngineState::new().visible_range(), None);
        let state = state_with_window(2, &[10, 10, 10, 10]);
        assert_eq!(state.visible_range(), Some((2, 5)));
    }
}
