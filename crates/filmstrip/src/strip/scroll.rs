//! The scroll/navigation engine.
//!
//! Page and full scrolls resolve a target position through the selection
//! state machine and queue a layout intent. Arrow scrolls are incremental:
//! they compute the pixel amount that keeps a preview margin of the next
//! item visible, clamp it to the per-gesture maximum and the collection
//! boundaries, and shift the existing window, extending and trimming it at
//! the edges instead of re-laying-out.

use tracing::trace;

use super::intent::LayoutIntent;
use super::view::StripView;
use super::{Direction, NO_POSITION};

impl StripView {
    // =========================================================================
    // Page and full scroll
    // =========================================================================

    /// Moves the selection by one screenful of positions.
    ///
    /// Returns `true` when handled; `false` with no adapter or no
    /// selectable target.
    pub fn page_scroll(&mut self, direction: Direction) -> bool {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() {
            return false;
        }
        if self.state.data_changed {
            self.layout_pass();
        }
        let window = self.state.window_len();
        let (next_page, forward) = match direction {
            Direction::Left => (
                (self.state.selected_position - window - 1).max(0),
                false,
            ),
            Direction::Right => (
                (self.state.selected_position + window - 1).min(self.state.item_count - 1),
                true,
            ),
        };
        if next_page < 0 {
            return false;
        }
        let position =
            self.look_for_selectable_position_after(self.state.selected_position, next_page, forward);
        if position < 0 {
            return false;
        }

        self.state.intent = LayoutIntent::SpecificPosition {
            position,
            left: self.list_left() + self.fading_edge_length,
        };
        // Near the ends, degrade to an edge-aligned fill so the window
        // never scrolls past the first or last item's edge.
        if forward && position > self.state.item_count - window {
            self.state.intent = LayoutIntent::ForceRightAlign;
        }
        if !forward && position < window {
            self.state.intent = LayoutIntent::ForceLeftAlign;
        }
        trace!(?direction, position, "page scroll");
        self.set_selection_int(position);
        true
    }

    /// Moves the selection to the first or last selectable position.
    ///
    /// Returns `true` when the selection was not already at that boundary.
    pub fn full_scroll(&mut self, direction: Direction) -> bool {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() {
            return false;
        }
        if self.state.data_changed {
            self.layout_pass();
        }
        let mut moved = false;
        match direction {
            Direction::Left => {
                if self.state.selected_position != 0 {
                    let position =
                        self.look_for_selectable_position_after(self.state.selected_position, 0, true);
                    if position >= 0 {
                        self.state.intent = LayoutIntent::ForceLeftAlign;
                        self.set_selection_int(position);
                    }
                    moved = true;
                }
            }
            Direction::Right => {
                let last = self.state.item_count - 1;
                if self.state.selected_position < last {
                    let position = self
                        .look_for_selectable_position_after(self.state.selected_position, last, false);
                    if position >= 0 {
                        self.state.intent = LayoutIntent::ForceRightAlign;
                        self.set_selection_int(position);
                    }
                    moved = true;
                }
            }
        }
        moved
    }

    // =========================================================================
    // Arrow scroll
    // =========================================================================

    /// Handles one arrow-key step: moves the selection to the next
    /// selectable position in `direction`, scrolling just enough to keep a
    /// preview margin of the neighbor visible, or moves focus within the
    /// window's focusable sub-elements when the slots can take focus.
    ///
    /// Returns `false` when there is nothing to select, focus or scroll.
    pub fn arrow_scroll(&mut self, direction: Direction) -> bool {
        self.affinity.debug_assert_same_thread();
        if self.adapter.is_none() {
            return false;
        }
        if self.state.data_changed {
            self.layout_pass();
        }
        // Arrow scrolls mutate the window in place; a relayout requested
        // by a signal handler mid-flight is deferred like a nested pass.
        self.state.in_layout = true;
        let handled = self.arrow_scroll_impl(direction);
        self.state.in_layout = false;
        if self.state.deferred_layout {
            self.state.deferred_layout = false;
            self.layout_pass();
        }
        handled
    }

    fn arrow_scroll_impl(&mut self, direction: Direction) -> bool {
        if self.state.window_len() == 0 {
            return false;
        }
        let selected_position = self.state.selected_position;
        let mut next = self.next_selected_position_for_direction(direction);
        let mut amount = self.amount_to_scroll(direction, next);

        let focus_result = if self.items_can_focus {
            self.arrow_scroll_focused(direction)
        } else {
            None
        };
        if let Some(focus) = focus_result {
            next = focus.position;
            amount = focus.amount;
        }

        let mut needs_redraw = focus_result.is_some();
        if next != NO_POSITION {
            self.apply_selection_flags(selected_position, next, focus_result.is_some());
            self.set_selected_position_int(next);
            self.set_next_selected_position_int(next);
            if self.items_can_focus && focus_result.is_none() {
                self.focused = None;
            }
            needs_redraw = true;
            self.check_selection_changed();
        }

        if amount > 0 {
            let signed = match direction {
                Direction::Left => amount,
                Direction::Right => -amount,
            };
            trace!(?direction, amount, "arrow scroll");
            self.scroll_slots_by(signed);
            needs_redraw = true;
        }

        // Focus that was left behind beyond the viewport is dropped.
        if self.items_can_focus && focus_result.is_none() {
            self.validate_focus();
            if let Some(target) = self.focused {
                if self.distance_to_target(target) > 0 {
                    self.focused = None;
                }
            }
        }

        if !needs_redraw {
            return false;
        }
        if let Some(slot) = self.state.window_slot(self.state.selected_position) {
            self.state.selected_left = slot.left;
        }
        self.sync_visible_range();
        true
    }

    /// Transfers the rendered-selection flag between the slots involved in
    /// an arrow move.
    fn apply_selection_flags(&mut self, old: i32, new: i32, focus_assigned: bool) {
        if let Some(slot) = self.state.window_slot_mut(old) {
            slot.selected = false;
        }
        if let Some(slot) = self.state.window_slot_mut(new) {
            slot.selected = !focus_assigned;
        }
    }

    /// The position an arrow step in `direction` should select, resolved
    /// to the nearest enabled position, or [`NO_POSITION`] when the
    /// selection is missing, off-window or already at the boundary.
    pub(crate) fn next_selected_position_for_direction(&self, direction: Direction) -> i32 {
        let selected_position = self.state.selected_position;
        let next = match direction {
            Direction::Right => match self.state.window_slot(selected_position) {
                Some(slot) if slot.right <= self.list_right() => {
                    if selected_position == NO_POSITION
                        || selected_position < self.state.first_position
                    {
                        self.state.first_position
                    } else {
                        selected_position + 1
                    }
                }
                _ => return NO_POSITION,
            },
            Direction::Left => match self.state.window_slot(selected_position) {
                Some(slot) if slot.left >= self.list_left() => {
                    let last = self.state.last_position();
                    if selected_position == NO_POSITION || selected_position > last {
                        last
                    } else {
                        selected_position - 1
                    }
                }
                _ => return NO_POSITION,
            },
        };
        if next < 0 || next >= self.state.item_count {
            return NO_POSITION;
        }
        self.look_for_selectable_position(next, direction.is_forward())
    }

    /// How many pixels to scroll so `next_selected` (or the window edge,
    /// with no target) becomes visible with its preview margin. Extends
    /// the window as needed to measure, clamps at collection boundaries
    /// and caps the result at [`max_scroll_amount`](Self::max_scroll_amount).
    pub(crate) fn amount_to_scroll(&mut self, direction: Direction, next_selected: i32) -> i32 {
        if self.state.slots.is_empty() {
            return 0;
        }
        let list_left = self.list_left();
        let list_right = self.list_right();
        match direction {
            Direction::Right => {
                let mut index = self.state.window_len() - 1;
                if next_selected != NO_POSITION {
                    index = next_selected - self.state.first_position;
                }
                while self.state.window_len() <= index {
                    self.add_slot_right();
                }
                let position = self.state.first_position + index;
                let Some(slot) = self.state.slots.get(index as usize) else {
                    return 0;
                };
                let mut goal = list_right;
                if position < self.state.item_count - 1 {
                    goal -= self.arrow_scroll_preview_length();
                }
                if slot.right <= goal {
                    return 0;
                }
                if next_selected != NO_POSITION && goal - slot.left >= self.max_scroll_amount() {
                    // The target is already generously visible.
                    return 0;
                }
                let mut amount = slot.right - goal;
                if self.state.first_position + self.state.window_len() == self.state.item_count {
                    if let Some(last) = self.state.slots.last() {
                        amount = amount.min(last.right - list_right);
                    }
                }
                amount.min(self.max_scroll_amount())
            }
            Direction::Left => {
                let mut index = 0;
                if next_selected != NO_POSITION {
                    index = next_selected - self.state.first_position;
                }
                while index < 0 {
                    self.add_slot_left();
                    index = next_selected - self.state.first_position;
                }
                let Some(slot) = self.state.slots.get(index as usize) else {
                    return 0;
                };
                let position = self.state.first_position + index;
                let mut goal = list_left;
                if position > 0 {
                    goal += self.arrow_scroll_preview_length();
                }
                if slot.left >= goal {
                    return 0;
                }
                if next_selected != NO_POSITION && slot.right - goal >= self.max_scroll_amount() {
                    return 0;
                }
                let mut amount = goal - slot.left;
                if self.state.first_position == 0 {
                    if let Some(first) = self.state.slots.first() {
                        amount = amount.min(list_left - first.left);
                    }
                }
                amount.min(self.max_scroll_amount())
            }
        }
    }

    // =========================================================================
    // Incremental window maintenance
    // =========================================================================

    /// Shifts the window by `amount` pixels (positive moves content
    /// toward the trailing edge), filling the exposed edge and recycling
    /// slots that left the viewport.
    pub(crate) fn scroll_slots_by(&mut self, amount: i32) {
        self.state.offset_window(amount);
        let list_left = self.list_left();
        let list_right = self.list_right();

        if amount < 0 {
            // Content moved left: extend on the right, recycle on the left.
            loop {
                let Some(last) = self.state.slots.last() else {
                    break;
                };
                if last.right >= list_right || self.state.last_position() >= self.state.item_count - 1
                {
                    break;
                }
                self.add_slot_right();
            }
            if let Some(last) = self.state.slots.last() {
                // Out of content: never scroll past the last item's edge.
                if last.right < list_right {
                    self.state.offset_window(list_right - last.right);
                }
            }
            while let Some(first) = self.state.slots.first() {
                if first.right >= list_left {
                    break;
                }
                let slot = self.state.slots.remove(0);
                self.recycler.release(slot);
                self.state.first_position += 1;
            }
        } else {
            // Content moved right: extend on the left, recycle on the right.
            loop {
                let Some(first) = self.state.slots.first() else {
                    break;
                };
                if first.left <= list_left || self.state.first_position == 0 {
                    break;
                }
                self.add_slot_left();
            }
            if let Some(first) = self.state.slots.first() {
                if first.left > list_left {
                    self.state.offset_window(list_left - first.left);
                }
            }
            while self
                .state
                .slots
                .last()
                .is_some_and(|last| last.left > list_right)
            {
                if let Some(slot) = self.state.slots.pop() {
                    self.recycler.release(slot);
                }
            }
        }
        self.state.debug_check_window();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::adapter::{StripItem, VecAdapter};
    use crate::strip::{Direction, StripView, NO_POSITION};

    fn uniform_strip(count: usize, width: i32, viewport: i32) -> StripView {
        let mut strip = StripView::new(viewport);
        strip.set_adapter(Some(Arc::new(VecAdapter::with_uniform_width(count, width))));
        strip
    }

    #[test]
    fn test_page_scroll_forward_never_overshoots() {
        // Viewport fits 4 full items; three pages land on the last item
        // with its trailing edge flush against the viewport edge.
        let mut strip = uniform_strip(10, 100, 400);
        strip.set_selection_from_anchor(0, 0);
        assert!(strip.page_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 3);
        assert!(strip.page_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 6);
        assert!(strip.page_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 9);
        assert_eq!(strip.visible_slot(9).unwrap().right, 400);
        assert!(strip.last_visible_position() < 10);
    }

    #[test]
    fn test_page_scroll_back_to_start() {
        let mut strip = uniform_strip(10, 100, 400);
        strip.full_scroll(Direction::Right);
        assert!(strip.page_scroll(Direction::Left));
        assert!(strip.page_scroll(Direction::Left));
        assert!(strip.page_scroll(Direction::Left));
        assert_eq!(strip.selected_position(), 0);
        assert_eq!(strip.visible_slot(0).unwrap().left, 0);
    }

    #[test]
    fn test_full_scroll_round_trip() {
        let mut strip = uniform_strip(10, 100, 400);
        assert!(strip.full_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 9);
        assert_eq!(strip.visible_slot(9).unwrap().right, 400);
        assert!(strip.full_scroll(Direction::Left));
        assert_eq!(strip.selected_position(), 0);
        assert_eq!(strip.visible_slot(0).unwrap().left, 0);
        assert!(!strip.full_scroll(Direction::Left), "already at the start");
    }

    #[test]
    fn test_arrow_scroll_single_item_not_handled() {
        let mut strip = uniform_strip(1, 100, 400);
        assert_eq!(strip.selected_position(), 0);
        assert!(!strip.arrow_scroll(Direction::Right));
        assert!(!strip.arrow_scroll(Direction::Left));
    }

    #[test]
    fn test_arrow_scroll_walks_selection() {
        let mut strip = uniform_strip(10, 100, 400);
        assert!(strip.arrow_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 1);
        assert!(strip.arrow_scroll(Direction::Left));
        assert_eq!(strip.selected_position(), 0);
        assert!(!strip.arrow_scroll(Direction::Left), "no position before 0");
    }

    #[test]
    fn test_arrow_scroll_keeps_preview_margin() {
        let mut strip = uniform_strip(10, 100, 400);
        // Walk to the last fully visible item, then one more.
        for _ in 0..3 {
            strip.arrow_scroll(Direction::Right);
        }
        assert_eq!(strip.selected_position(), 3);
        assert!(strip.arrow_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 4);
        let slot = strip.visible_slot(4).unwrap();
        // The selection is fully visible and a preview sliver of item 5
        // remains: the window scrolled just far enough.
        assert!(slot.right <= 400 - strip.arrow_scroll_preview_length());
        assert!(strip.visible_slot(5).is_some());
    }

    #[test]
    fn test_arrow_scroll_recycles_offscreen_slots() {
        let mut strip = uniform_strip(30, 100, 400);
        for _ in 0..12 {
            strip.arrow_scroll(Direction::Right);
        }
        assert_eq!(strip.selected_position(), 12);
        assert!(strip.first_visible_position() > 0, "leading slots recycled");
        let span = strip.window_len() as i32;
        assert!(span <= 6, "window stays bounded, got {span}");
    }

    #[test]
    fn test_arrow_scroll_amount_capped() {
        // One huge item: a single gesture may cover at most a third of
        // the viewport.
        let items = vec![StripItem::new(2000), StripItem::new(2000)];
        let mut strip = StripView::new(300);
        strip.set_adapter(Some(Arc::new(VecAdapter::new(items))));
        let left_before = strip.visible_slot(0).unwrap().left;
        assert!(strip.arrow_scroll(Direction::Right));
        let left_after = strip.visible_slot(0).unwrap().left;
        assert!(
            left_before - left_after <= strip.max_scroll_amount(),
            "scroll bounded per gesture"
        );
    }

    #[test]
    fn test_arrow_scroll_clamps_at_trailing_boundary() {
        let mut strip = uniform_strip(5, 100, 400);
        for _ in 0..10 {
            strip.arrow_scroll(Direction::Right);
        }
        assert_eq!(strip.selected_position(), 4);
        let last = strip.visible_slot(4).unwrap();
        assert_eq!(last.right, 400, "never scrolls past the last item's edge");
    }

    #[test]
    fn test_arrow_scroll_skips_disabled() {
        let items: Vec<StripItem> = (0..6)
            .map(|i| StripItem::new(100).with_enabled(i != 1))
            .collect();
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(Arc::new(VecAdapter::new(items))));
        assert_eq!(strip.selected_position(), 0);
        assert!(strip.arrow_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), 2, "disabled neighbor skipped");
    }

    #[test]
    fn test_navigation_without_adapter_is_not_handled() {
        let mut strip = StripView::new(400);
        assert!(!strip.arrow_scroll(Direction::Right));
        assert!(!strip.page_scroll(Direction::Right));
        assert!(!strip.full_scroll(Direction::Right));
        assert_eq!(strip.selected_position(), NO_POSITION);
    }

    #[test]
    fn test_visible_range_tracks_arrow_scroll() {
        use parking_lot::Mutex;
        let mut strip = uniform_strip(30, 100, 400);
        let ranges = Arc::new(Mutex::new(Vec::new()));
        let r = ranges.clone();
        strip.visible_range_changed.connect(move |&range| {
            r.lock().push(range);
        });
        for _ in 0..12 {
            strip.arrow_scroll(Direction::Right);
        }
        let seen = ranges.lock();
        assert!(!seen.is_empty());
        let &(first, last) = seen.last().unwrap();
        assert_eq!((first, last), (
            strip.first_visible_position(),
            strip.last_visible_position()
        ));
    }
}
