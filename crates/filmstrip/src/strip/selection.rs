//! The selection state machine.
//!
//! Selection is two-phase: callers request a *pending* selection
//! (`next_selected_position`), resolved to the nearest enabled position;
//! the next layout pass commits it. A selection-changed notification fires
//! at most once per pass, when the committed position or id differs from
//! the last one delivered.

use tracing::trace;

use super::intent::LayoutIntent;
use super::view::StripView;
use super::NO_POSITION;

impl StripView {
    // =========================================================================
    // Selectable-position scans
    // =========================================================================

    /// Scans from `position` for the nearest enabled position, forward or
    /// backward. Returns [`NO_POSITION`] if none exists in that direction.
    pub fn look_for_selectable_position(&self, position: i32, look_forward: bool) -> i32 {
        let Some(adapter) = self.adapter.as_ref() else {
            return NO_POSITION;
        };
        let count = self.state.item_count;
        let mut position = position;
        if !self.all_enabled {
            if look_forward {
                position = position.max(0);
                while position < count && !adapter.is_enabled(position as usize) {
                    position += 1;
                }
            } else {
                position = position.min(count - 1);
                while position >= 0 && !adapter.is_enabled(position as usize) {
                    position -= 1;
                }
            }
        }
        if position < 0 || position >= count {
            NO_POSITION
        } else {
            position
        }
    }

    /// Like [`look_for_selectable_position`](Self::look_for_selectable_position),
    /// but when the scan past `position` fails it backtracks toward
    /// `current`, so a request onto a disabled region degrades to the
    /// nearest enabled position between the two instead of losing the
    /// selection.
    pub fn look_for_selectable_position_after(
        &self,
        current: i32,
        position: i32,
        look_forward: bool,
    ) -> i32 {
        let Some(adapter) = self.adapter.as_ref() else {
            return NO_POSITION;
        };
        let after = self.look_for_selectable_position(position, look_forward);
        if after != NO_POSITION {
            return after;
        }
        let count = self.state.item_count;
        let current = current.clamp(NO_POSITION, count - 1);
        if look_forward {
            let mut position = (position - 1).min(count - 1);
            while position > current && !adapter.is_enabled(position as usize) {
                position -= 1;
            }
            if position <= current {
                NO_POSITION
            } else {
                position
            }
        } else {
            let mut position = (position + 1).max(0);
            while position < current && !adapter.is_enabled(position as usize) {
                position += 1;
            }
            if position >= current {
                NO_POSITION
            } else {
                position
            }
        }
    }

    // =========================================================================
    // Selection requests
    // =========================================================================

    /// Selects `position`, anchored at the leading edge.
    pub fn set_selection(&mut self, position: i32) {
        self.set_selection_from_anchor(position, 0);
    }

    /// Selects `position` with its left edge `left_offset` pixels from the
    /// leading padding edge.
    ///
    /// The request resolves to the nearest enabled position at or after
    /// `position`; with none, it is ignored. A pending positioning action
    /// from an earlier request is superseded.
    pub fn set_selection_from_anchor(&mut self, position: i32, left_offset: i32) {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() {
            return;
        }
        let position = self.look_for_selectable_position(position, true);
        if position < 0 {
            return;
        }
        self.set_next_selected_position_int(position);
        self.state.intent = LayoutIntent::SpecificPosition {
            position,
            left: self.list_left() + left_offset,
        };
        if self.state.need_sync {
            self.state.sync_position = position;
            self.state.sync_id = self.id_of(position);
        }
        self.request_relayout();
    }

    /// Moves the selection by `delta` positions, resolved to the nearest
    /// enabled position, using the incremental move path.
    ///
    /// Returns `false` when there is nothing to move to.
    pub fn move_selection_by(&mut self, delta: i32) -> bool {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() || delta == 0 {
            return false;
        }
        if self.state.data_changed {
            self.layout_pass();
        }
        let current = self.state.selected_position;
        if current == NO_POSITION {
            return false;
        }
        let count = self.state.item_count;
        let target = (current + delta).clamp(0, count - 1);
        let position = self.look_for_selectable_position_after(current, target, delta > 0);
        if position < 0 || position == current {
            return false;
        }
        self.state.intent = LayoutIntent::MoveSelectionBy {
            delta: position - current,
        };
        self.set_selection_int(position);
        true
    }

    /// Re-anchors the committed selection to satisfy the selection-pixel
    /// margins: nudged from its current slot when one is attached, else
    /// centered in the viewport.
    ///
    /// Returns `false` with no adapter or no selection.
    pub fn reveal_selection(&mut self) -> bool {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() || self.state.selected_position == NO_POSITION {
            return false;
        }
        self.set_next_selected_position_int(self.state.selected_position);
        self.state.intent = LayoutIntent::SyncWithSelection;
        self.request_relayout();
        true
    }

    /// Commits `position` as the pending selection and lays out now.
    /// Internal path shared by the navigation operations.
    pub(crate) fn set_selection_int(&mut self, position: i32) {
        self.set_next_selected_position_int(position);
        self.layout_pass();
    }

    // =========================================================================
    // State-machine internals
    // =========================================================================

    pub(crate) fn set_selected_position_int(&mut self, position: i32) {
        self.state.selected_position = position;
        self.state.selected_id = self.id_of(position);
    }

    pub(crate) fn set_next_selected_position_int(&mut self, position: i32) {
        self.state.next_selected_position = position;
        self.state.next_selected_id = self.id_of(position);
    }

    /// Clamps the committed selection into the collection bounds.
    pub(crate) fn reconcile_selected_position(&self) -> i32 {
        self.state
            .selected_position
            .max(0)
            .min(self.state.item_count - 1)
    }

    /// Fires the selection-changed signal when the committed selection
    /// differs from the last one delivered.
    pub(crate) fn check_selection_changed(&mut self) {
        let selected = self.state.selected_position;
        let id = self.state.selected_id;
        if selected != self.state.old_selected_position || id != self.state.old_selected_id {
            trace!(selected, "selection changed");
            self.state.old_selected_position = selected;
            self.state.old_selected_id = id;
            self.selection_changed.emit(selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::adapter::{StripItem, VecAdapter};
    use crate::strip::{StripView, NO_POSITION};

    /// Eight positions, of which exactly {2, 5, 7} are enabled.
    fn sparse_strip() -> StripView {
        let items: Vec<StripItem> = (0..8)
            .map(|i| StripItem::new(100).with_enabled(matches!(i, 2 | 5 | 7)))
            .collect();
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(Arc::new(VecAdapter::new(items))));
        strip
    }

    #[test]
    fn test_scan_forward_finds_next_enabled() {
        let strip = sparse_strip();
        assert_eq!(strip.look_for_selectable_position(3, true), 5);
        assert_eq!(strip.look_for_selectable_position(8, true), NO_POSITION);
        assert_eq!(strip.look_for_selectable_position(0, true), 2);
        assert_eq!(strip.look_for_selectable_position(7, true), 7);
    }

    #[test]
    fn test_scan_backward_finds_previous_enabled() {
        let strip = sparse_strip();
        assert_eq!(strip.look_for_selectable_position(4, false), 2);
        assert_eq!(strip.look_for_selectable_position(1, false), NO_POSITION);
        assert_eq!(strip.look_for_selectable_position(9, false), 7);
    }

    #[test]
    fn test_scan_after_backtracks_toward_current() {
        let strip = sparse_strip();
        // Forward from 6 hits 7; no backtrack needed.
        assert_eq!(strip.look_for_selectable_position_after(2, 6, true), 7);
        // Forward from 8 fails; backtracks to 7, still past current=2.
        assert_eq!(strip.look_for_selectable_position_after(2, 8, true), 7);
        // Forward past the end with current already at the last enabled
        // position: nothing new to select.
        assert_eq!(strip.look_for_selectable_position_after(7, 8, true), NO_POSITION);
        // Backward from 1 fails; backtracks up to 2, before current=5.
        assert_eq!(strip.look_for_selectable_position_after(5, 1, false), 2);
        assert_eq!(strip.look_for_selectable_position_after(2, 1, false), NO_POSITION);
    }

    #[test]
    fn test_initial_selection_skips_disabled() {
        let strip = sparse_strip();
        assert_eq!(strip.selected_position(), 2);
    }

    #[test]
    fn test_set_selection_resolves_to_enabled() {
        let mut strip = sparse_strip();
        strip.set_selection(3);
        assert_eq!(strip.selected_position(), 5);
        // Requests past the last enabled position are ignored.
        strip.set_selection(8);
        assert_eq!(strip.selected_position(), 5);
    }

    #[test]
    fn test_selection_marks_slot() {
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(Arc::new(VecAdapter::with_uniform_width(10, 100))));
        strip.set_selection(2);
        assert!(strip.visible_slot(2).unwrap().selected);
        assert!(!strip.visible_slot(1).unwrap().selected);
    }

    #[test]
    fn test_no_selection_when_nothing_enabled() {
        let items: Vec<StripItem> = (0..4)
            .map(|_| StripItem::new(100).with_enabled(false))
            .collect();
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(Arc::new(VecAdapter::new(items))));
        assert_eq!(strip.selected_position(), NO_POSITION);
        // The window still fills; only selection is empty.
        assert_eq!(strip.window_len(), 4);
    }

    #[test]
    fn test_move_selection_by_steps_over_disabled() {
        let mut strip = sparse_strip();
        assert_eq!(strip.selected_position(), 2);
        assert!(strip.move_selection_by(1));
        assert_eq!(strip.selected_position(), 5);
        assert!(strip.move_selection_by(1));
        assert_eq!(strip.selected_position(), 7);
        assert!(!strip.move_selection_by(1), "nothing past the last enabled");
        assert!(strip.move_selection_by(-1));
        assert_eq!(strip.selected_position(), 5);
    }

    #[test]
    fn test_reveal_selection_applies_fading_margin() {
        let mut strip = StripView::new(400).with_fading_edge_length(16);
        strip.set_adapter(Some(Arc::new(VecAdapter::with_uniform_width(10, 100))));
        strip.set_selection_from_anchor(5, 0);
        assert_eq!(strip.visible_slot(5).unwrap().left, 0);

        assert!(strip.reveal_selection());
        // An interior selection keeps a fading-edge sliver of its left
        // neighbor visible.
        assert_eq!(strip.visible_slot(5).unwrap().left, 16);
        assert!(strip.visible_slot(4).is_some());
    }

    #[test]
    fn test_reveal_selection_centers_unanchored_selection() {
        use crate::strip::LayoutIntent;
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(Arc::new(VecAdapter::with_uniform_width(10, 100))));
        strip.set_selection(5);
        // With no anchor slot to nudge from, the selection is centered.
        strip.state.slots.clear();
        strip.state.intent = LayoutIntent::SyncWithSelection;
        strip.request_relayout();
        let slot = strip.visible_slot(5).unwrap();
        assert_eq!((slot.left, slot.right), (150, 250));
    }

    #[test]
    fn test_reveal_selection_without_selection() {
        let mut strip = StripView::new(400);
        assert!(!strip.reveal_selection());
    }

    #[test]
    fn test_selection_changed_payload() {
        use parking_lot::Mutex;
        let mut strip = sparse_strip();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        strip.selection_changed.connect(move |&position| {
            s.lock().push(position);
        });
        strip.set_selection(5);
        strip.set_selection(5); // no-op
        strip.set_selection(7);
        assert_eq!(*seen.lock(), vec![5, 7]);
    }
}
