//! The strip view facade.
//!
//! [`StripView`] owns the engine state, the recycler and the adapter
//! handle, and exposes the operations hosts drive it with: selection,
//! navigation, relayout and change notification. Layout itself lives in
//! `layout.rs`, navigation in `scroll.rs`, the selection state machine in
//! `selection.rs` and focus search in `focus.rs`.

use std::sync::Arc;

use filmstrip_core::{Signal, ThreadAffinity};
use tracing::debug;

use crate::adapter::StripAdapter;

use super::focus::FocusTarget;
use super::intent::LayoutIntent;
use super::recycler::Recycler;
use super::slot::Slot;
use super::state::{EngineState, SyncMode};
use super::NO_POSITION;

/// Fraction of the viewport a single arrow-scroll gesture may cover.
pub(crate) const MAX_SCROLL_FACTOR: f32 = 0.33;

/// Minimum visible sliver of the item beyond the selection, in pixels.
pub(crate) const MIN_SCROLL_PREVIEW_PIXELS: i32 = 2;

/// A headless, virtualized, horizontally-scrollable strip of slots.
///
/// The view materializes only the positions that intersect the viewport,
/// recycling detached slots by kind, and tracks a single selection with
/// optional sub-slot focus. All operations are synchronous and must run on
/// the thread that created the view.
///
/// # Signals
///
/// - [`selection_changed`](Self::selection_changed): the committed
///   selection moved; carries the new position ([`NO_POSITION`] for none).
/// - [`visible_range_changed`](Self::visible_range_changed): the window of
///   attached positions changed; carries `(first, last)`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use filmstrip::adapter::VecAdapter;
/// use filmstrip::strip::{Direction, StripView};
///
/// let mut strip = StripView::new(480).with_fading_edge_length(16);
/// strip.set_adapter(Some(Arc::new(VecAdapter::with_uniform_width(100, 64))));
///
/// assert_eq!(strip.first_visible_position(), 0);
/// strip.full_scroll(Direction::Right);
/// assert_eq!(strip.selected_position(), 99);
/// ```
pub struct StripView {
    pub(crate) affinity: ThreadAffinity,
    pub(crate) adapter: Option<Arc<dyn StripAdapter>>,
    pub(crate) recycler: Recycler,
    pub(crate) state: EngineState,

    // Geometry.
    pub(crate) viewport_width: i32,
    pub(crate) padding_left: i32,
    pub(crate) padding_right: i32,
    pub(crate) divider_width: i32,
    pub(crate) fading_edge_length: i32,

    // Policy.
    pub(crate) stack_from_end: bool,
    pub(crate) items_can_focus: bool,
    pub(crate) all_enabled: bool,

    pub(crate) focused: Option<FocusTarget>,

    /// Emitted once per layout pass when the committed selection differs
    /// from the last notified one.
    pub selection_changed: Signal<i32>,
    /// Emitted when the attached position range changes.
    pub visible_range_changed: Signal<(i32, i32)>,
}

impl StripView {
    /// Creates a strip view for a viewport of the given pixel width.
    pub fn new(viewport_width: i32) -> Self {
        Self {
            affinity: ThreadAffinity::current(),
            adapter: None,
            recycler: Recycler::new(),
            state: EngineState::new(),
            viewport_width,
            padding_left: 0,
            padding_right: 0,
            divider_width: 0,
            fading_edge_length: 0,
            stack_from_end: false,
            items_can_focus: false,
            all_enabled: true,
            focused: None,
            selection_changed: Signal::new(),
            visible_range_changed: Signal::new(),
        }
    }

    /// Sets the leading/trailing padding using builder style.
    pub fn with_padding(mut self, left: i32, right: i32) -> Self {
        self.padding_left = left;
        self.padding_right = right;
        self
    }

    /// Sets the divider width using builder style.
    pub fn with_divider_width(mut self, width: i32) -> Self {
        self.divider_width = width;
        self
    }

    /// Sets the fading-edge length using builder style.
    pub fn with_fading_edge_length(mut self, length: i32) -> Self {
        self.fading_edge_length = length;
        self
    }

    /// Fills from the trailing edge using builder style.
    pub fn with_stack_from_end(mut self, stack_from_end: bool) -> Self {
        self.stack_from_end = stack_from_end;
        self
    }

    /// Enables sub-slot focus traversal using builder style.
    pub fn with_items_can_focus(mut self, items_can_focus: bool) -> Self {
        self.items_can_focus = items_can_focus;
        self
    }

    // =========================================================================
    // Adapter
    // =========================================================================

    /// The adapter currently driving the strip.
    pub fn adapter(&self) -> Option<&Arc<dyn StripAdapter>> {
        self.adapter.as_ref()
    }

    /// Sets or clears the adapter.
    ///
    /// The window is rebuilt from scratch: the recycler is emptied, the
    /// per-kind pools are resized from the adapter's
    /// [`kind_count`](StripAdapter::kind_count), and the initial selection
    /// is the first selectable position (the last, under
    /// [`stack_from_end`](Self::set_stack_from_end)).
    pub fn set_adapter(&mut self, adapter: Option<Arc<dyn StripAdapter>>) {
        self.affinity.debug_assert_same_thread();
        self.reset_window();
        self.recycler.clear();
        self.adapter = adapter;
        self.state.old_selected_position = NO_POSITION;
        self.state.old_selected_id = i64::MIN;
        if let Some(adapter) = self.adapter.clone() {
            self.all_enabled = adapter.all_enabled();
            self.state.old_item_count = self.state.item_count;
            self.state.item_count = adapter.count() as i32;
            self.recycler.set_kind_count(adapter.kind_count());
            let position = if self.stack_from_end {
                self.look_for_selectable_position(self.state.item_count - 1, false)
            } else {
                self.look_for_selectable_position(0, true)
            };
            self.set_selected_position_int(position);
            self.set_next_selected_position_int(position);
            if self.state.item_count == 0 {
                self.check_selection_changed();
            }
        } else {
            self.all_enabled = true;
            self.state.item_count = 0;
            self.check_selection_changed();
        }
        self.state.layout_dirty = true;
        self.request_relayout();
    }

    /// Tells the engine the adapter's content changed.
    ///
    /// Must be called on the owning thread after any mutation of the
    /// collection and before the next layout pass. The engine remembers a
    /// sync target (the selected row when one exists, else the first
    /// visible row) and re-anchors on it during the pass this triggers.
    pub fn notify_changed(&mut self) {
        self.affinity
            .assert_same_thread("notify_changed must run on the engine's owning thread");
        let Some(adapter) = self.adapter.clone() else {
            return;
        };
        self.state.data_changed = true;
        self.state.old_item_count = self.state.item_count;
        self.state.item_count = adapter.count() as i32;
        self.all_enabled = adapter.all_enabled();
        self.remember_sync_state(&adapter);
        debug!(
            old_count = self.state.old_item_count,
            new_count = self.state.item_count,
            "adapter content changed"
        );
        self.request_relayout();
    }

    /// Records where to re-anchor after the pending data change.
    fn remember_sync_state(&mut self, adapter: &Arc<dyn StripAdapter>) {
        if self.state.window_len() == 0 {
            return;
        }
        self.state.need_sync = true;
        if self.state.selected_position >= 0 {
            if let Some(slot) = self.state.window_slot(self.state.selected_position) {
                self.state.sync_left = slot.left;
            }
            // Ids were cached before the change; the adapter is already new.
            self.state.sync_id = self.state.next_selected_id;
            self.state.sync_position = self.state.next_selected_position;
            self.state.sync_mode = SyncMode::Selection;
        } else {
            let first = self.state.first_position;
            self.state.sync_left = self
                .state
                .slots
                .first()
                .map(|slot| slot.left)
                .unwrap_or_else(|| self.list_left());
            self.state.sync_id = if first >= 0 && first < adapter.count() as i32 {
                adapter.stable_id(first as usize)
            } else {
                i64::MIN
            };
            self.state.sync_position = first;
            self.state.sync_mode = SyncMode::FirstVisible;
        }
    }

    // =========================================================================
    // Layout requests
    // =========================================================================

    /// Runs a layout pass now, or defers it if one is already in progress.
    ///
    /// Idempotent: with no intervening state change, a second call
    /// reproduces the same window. Requests arriving while a pass is
    /// running are coalesced into a single follow-up pass.
    pub fn request_relayout(&mut self) {
        self.affinity.debug_assert_same_thread();
        self.state.layout_dirty = true;
        self.layout_pass();
    }

    /// Changes the viewport width, keeping the selected slot anchored.
    pub fn resize(&mut self, viewport_width: i32) {
        self.affinity.debug_assert_same_thread();
        if viewport_width == self.viewport_width {
            return;
        }
        let anchor = self
            .state
            .window_slot(self.state.selected_position)
            .map(|slot| (slot.position, slot.left, slot.right));
        self.viewport_width = viewport_width;
        match anchor {
            Some((position, left, right)) => {
                // Pull the anchor back in if the new viewport cuts it off.
                let overshoot = (right - (viewport_width - self.padding_right)).max(0);
                let left_offset = left - self.padding_left - overshoot;
                self.set_selection_from_anchor(position, left_offset);
            }
            None => self.request_relayout(),
        }
    }

    // =========================================================================
    // Geometry and policy
    // =========================================================================

    /// The viewport width in pixels.
    pub fn viewport_width(&self) -> i32 {
        self.viewport_width
    }

    /// Sets the leading/trailing padding.
    pub fn set_padding(&mut self, left: i32, right: i32) {
        if (self.padding_left, self.padding_right) != (left, right) {
            self.padding_left = left;
            self.padding_right = right;
            self.request_relayout();
        }
    }

    /// The layout space between consecutive slots.
    pub fn divider_width(&self) -> i32 {
        self.divider_width
    }

    /// Sets the layout space between consecutive slots.
    pub fn set_divider_width(&mut self, width: i32) {
        if self.divider_width != width {
            self.divider_width = width;
            self.request_relayout();
        }
    }

    /// The fading-edge length shaping the selection-pixel margins.
    pub fn fading_edge_length(&self) -> i32 {
        self.fading_edge_length
    }

    /// Sets the fading-edge length.
    pub fn set_fading_edge_length(&mut self, length: i32) {
        self.fading_edge_length = length;
    }

    /// Whether initial fills anchor at the trailing edge.
    pub fn stack_from_end(&self) -> bool {
        self.stack_from_end
    }

    /// Sets the fill-direction policy.
    pub fn set_stack_from_end(&mut self, stack_from_end: bool) {
        if self.stack_from_end != stack_from_end {
            self.stack_from_end = stack_from_end;
            self.request_relayout();
        }
    }

    /// Whether arrow navigation may move focus inside slots.
    pub fn items_can_focus(&self) -> bool {
        self.items_can_focus
    }

    /// Enables or disables sub-slot focus traversal.
    pub fn set_items_can_focus(&mut self, items_can_focus: bool) {
        self.items_can_focus = items_can_focus;
        if !items_can_focus {
            self.focused = None;
        }
    }

    /// The largest pixel delta a single arrow-scroll gesture may cover.
    pub fn max_scroll_amount(&self) -> i32 {
        (MAX_SCROLL_FACTOR * self.viewport_width as f32) as i32
    }

    /// Leading edge of the slot area.
    #[inline]
    pub(crate) fn list_left(&self) -> i32 {
        self.padding_left
    }

    /// Trailing edge of the slot area.
    #[inline]
    pub(crate) fn list_right(&self) -> i32 {
        self.viewport_width - self.padding_right
    }

    // =========================================================================
    // Window queries
    // =========================================================================

    /// Position of the leftmost attached slot, or [`NO_POSITION`] when the
    /// window is empty.
    pub fn first_visible_position(&self) -> i32 {
        if self.state.slots.is_empty() {
            NO_POSITION
        } else {
            self.state.first_position
        }
    }

    /// Position of the rightmost attached slot, or [`NO_POSITION`].
    pub fn last_visible_position(&self) -> i32 {
        self.state.last_position()
    }

    /// Number of attached slots.
    pub fn window_len(&self) -> usize {
        self.state.slots.len()
    }

    /// The attached slots, leftmost first.
    pub fn slots(&self) -> &[Slot] {
        &self.state.slots
    }

    /// The attached slot bound to `position`, if it is in the window.
    pub fn visible_slot(&self, position: i32) -> Option<&Slot> {
        self.state.window_slot(position)
    }

    /// Marks the attached slot at `position` pressed or released.
    ///
    /// Hosts integrating pointer input set this so the slot's render state
    /// follows the gesture; the engine itself never presses slots.
    pub fn set_pressed(&mut self, position: i32, pressed: bool) {
        self.affinity.debug_assert_same_thread();
        if let Some(slot) = self.state.window_slot_mut(position) {
            slot.pressed = pressed;
        }
    }

    // =========================================================================
    // Selection queries
    // =========================================================================

    /// The committed selection, or [`NO_POSITION`].
    pub fn selected_position(&self) -> i32 {
        self.state.selected_position
    }

    /// Stable id of the committed selection, or `i64::MIN` for none.
    pub fn selected_id(&self) -> i64 {
        self.state.selected_id
    }

    /// Left edge of the selected slot after the last layout pass.
    pub fn selected_left(&self) -> i32 {
        self.state.selected_left
    }

    /// The sub-slot focus target, if focus moved inside a slot.
    pub fn focused_target(&self) -> Option<FocusTarget> {
        self.focused
    }

    /// Drops any sub-slot focus.
    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    // =========================================================================
    // Internal plumbing shared by layout and navigation
    // =========================================================================

    /// Detaches the whole window into the recycler and clears selection
    /// and sync bookkeeping.
    pub(crate) fn reset_window(&mut self) {
        let drained: Vec<Slot> = self.state.slots.drain(..).collect();
        for slot in drained {
            self.recycler.release(slot);
        }
        self.state.first_position = 0;
        self.state.selected_position = NO_POSITION;
        self.state.selected_id = i64::MIN;
        self.state.next_selected_position = NO_POSITION;
        self.state.next_selected_id = i64::MIN;
        self.state.selected_left = 0;
        self.state.need_sync = false;
        self.state.data_changed = false;
        self.state.intent = LayoutIntent::None;
        self.focused = None;
    }

    /// Emits the visible-range signal when the attached range moved.
    pub(crate) fn sync_visible_range(&mut self) {
        let range = self.state.visible_range();
        if range != self.state.last_notified_range {
            self.state.last_notified_range = range;
            if let Some((first, last)) = range {
                self.visible_range_changed.emit((first, last));
            }
        }
    }

    /// Arrow-scroll preview margin: at least a couple of pixels of the
    /// neighbor beyond the selection stay visible.
    pub(crate) fn arrow_scroll_preview_length(&self) -> i32 {
        MIN_SCROLL_PREVIEW_PIXELS.max(self.fading_edge_length)
    }

    /// Stable id of `position` under the current adapter.
    pub(crate) fn id_of(&self, position: i32) -> i64 {
        match (&self.adapter, position) {
            (Some(adapter), p) if p >= 0 && p < self.state.item_count => {
                adapter.stable_id(p as usize)
            }
            _ => i64::MIN,
        }
    }
}

/// The adapter's reported count changed without a change notification.
#[cold]
#[inline(never)]
pub(crate) fn adapter_contract_violation(recorded: i32, actual: usize) -> ! {
    panic!(
        "ADAPTER CONTRACT VIOLATION: item count changed from {recorded} to {actual} without a \
         change notification. Mutate the collection only on the engine's owning thread and call \
         StripView::notify_changed() before the next layout pass."
    )
}

/// The selection left the valid range without passing through the
/// selection state machine.
#[cold]
#[inline(never)]
pub(crate) fn selection_contract_violation(selected: i32, count: i32) -> ! {
    panic!(
        "SELECTION CONTRACT VIOLATION: selected position {selected} is outside [-1, {count}). \
         Selection must be driven through set_selection/set_selection_from_anchor or the \
         navigation operations."
    )
}

static_assertions::assert_impl_all!(StripView: Send);
