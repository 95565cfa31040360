//! The layout engine.
//!
//! A layout pass tears the current window down into the recycler, consumes
//! the pending [`LayoutIntent`] to refill the viewport from an anchor, and
//! corrects boundary anomalies (a gap at one edge while more content
//! exists, or unused space while the collection is exhausted). Fills are
//! incremental everywhere else: scrolling and arrow navigation extend and
//! trim the existing window instead of rebuilding it.

use tracing::{debug, trace};

use super::intent::LayoutIntent;
use super::slot::{Slot, SlotId};
use super::state::SyncMode;
use super::view::{adapter_contract_violation, selection_contract_violation, StripView};
use super::NO_POSITION;

/// Pixel slack used to nudge a selection stuck off the leading edge back
/// into view when its position did not change.
const STUCK_SELECTION_SLACK: i32 = 20;

impl StripView {
    // =========================================================================
    // Slot materialization
    // =========================================================================

    /// Materializes a slot for `position` and attaches it to the window.
    ///
    /// `x` is the slot's left edge when `flow_right`, else its right edge.
    /// Reuse order: the active index (same position, during a data-change
    /// pass), then the kind pool, then a fresh slot. Pooled slots are fully
    /// rebound; no stale field survives.
    pub(crate) fn make_and_attach(
        &mut self,
        position: i32,
        x: i32,
        flow_right: bool,
        selected: bool,
    ) {
        let Some(adapter) = self.adapter.clone() else {
            return;
        };
        let kind = adapter.kind_of(position as usize);

        let mut slot = None;
        if self.state.data_changed {
            if let Some(active) = self.recycler.claim_active(position) {
                if active.kind == kind {
                    slot = Some(active);
                } else {
                    self.recycler.release(active);
                }
            }
        }
        let mut slot = slot
            .or_else(|| self.recycler.obtain(kind))
            .unwrap_or_else(|| {
                let id = SlotId(self.state.next_slot_id);
                self.state.next_slot_id += 1;
                trace!(position, kind = kind.0, "materializing fresh slot");
                Slot::new(id, position, kind)
            });

        let width = adapter.item_width(position as usize);
        slot.position = position;
        slot.kind = kind;
        slot.focus_spans = adapter.focus_spans(position as usize);
        slot.selected = selected;
        slot.pressed = false;
        slot.left = if flow_right { x } else { x - width };
        slot.right = slot.left + width;

        if flow_right {
            self.state.slots.push(slot);
        } else {
            self.state.slots.insert(0, slot);
        }
    }

    /// Extends the window by one slot on the trailing side.
    pub(crate) fn add_slot_right(&mut self) {
        let Some(last) = self.state.slots.last() else {
            return;
        };
        let position = last.position + 1;
        let x = last.right + self.divider_width;
        let selected = position == self.state.selected_position;
        self.make_and_attach(position, x, true, selected);
    }

    /// Extends the window by one slot on the leading side.
    pub(crate) fn add_slot_left(&mut self) {
        let Some(first) = self.state.slots.first() else {
            return;
        };
        let position = first.position - 1;
        let x = first.left - self.divider_width;
        let selected = position == self.state.selected_position;
        self.make_and_attach(position, x, false, selected);
        self.state.first_position = position;
    }

    // =========================================================================
    // Fill primitives
    // =========================================================================

    /// Places slots left-to-right from `next_left` until the trailing edge
    /// or the end of the collection.
    pub(crate) fn fill_right(&mut self, mut position: i32, mut next_left: i32) {
        let end = self.list_right();
        while next_left < end && position < self.state.item_count {
            let selected = position == self.state.selected_position;
            self.make_and_attach(position, next_left, true, selected);
            let Some(last) = self.state.slots.last() else {
                break;
            };
            next_left = last.right + self.divider_width;
            position += 1;
        }
    }

    /// Places slots right-to-left from `next_right` until the leading edge
    /// or position 0, updating `first_position`.
    pub(crate) fn fill_left(&mut self, mut position: i32, mut next_right: i32) {
        let end = self.list_left();
        while next_right > end && position >= 0 {
            let selected = position == self.state.selected_position;
            self.make_and_attach(position, next_right, false, selected);
            let Some(first) = self.state.slots.first() else {
                break;
            };
            next_right = first.left - self.divider_width;
            position -= 1;
        }
        self.state.first_position = position + 1;
    }

    /// Fills the window from its leading edge, clamping `first_position`
    /// to the selection and the collection bounds first.
    pub(crate) fn fill_from_left(&mut self, next_left: i32) {
        self.state.first_position = self
            .state
            .first_position
            .min(self.state.selected_position)
            .min(self.state.item_count - 1)
            .max(0);
        let first = self.state.first_position;
        self.fill_right(first, next_left);
    }

    /// Left edge of the attached slot at `position`, if present.
    fn window_left_of(&self, position: i32) -> Option<i32> {
        self.state.window_slot(position).map(|slot| slot.left)
    }

    /// Right edge of the attached slot at `position`, if present.
    fn window_right_of(&self, position: i32) -> Option<i32> {
        self.state.window_slot(position).map(|slot| slot.right)
    }

    /// Fills outward around an attached anchor, honoring the fill
    /// direction policy.
    fn fill_outward(&mut self, position: i32) {
        let divider = self.divider_width;
        if self.stack_from_end {
            if let Some(right) = self.window_right_of(position) {
                self.fill_right(position + 1, right + divider);
            }
            self.adjust_window();
            if let Some(left) = self.window_left_of(position) {
                self.fill_left(position - 1, left - divider);
            }
        } else {
            if let Some(left) = self.window_left_of(position) {
                self.fill_left(position - 1, left - divider);
            }
            self.adjust_window();
            if let Some(right) = self.window_right_of(position) {
                self.fill_right(position + 1, right + divider);
            }
        }
    }

    /// Anchors a reconciled selection in the middle of the viewport and
    /// fills outward. Used when no prior anchor slot is known.
    pub(crate) fn fill_from_middle(&mut self, children_left: i32, children_right: i32) {
        let width = children_right - children_left;
        let position = self.reconcile_selected_position();
        self.make_and_attach(position, children_left, true, true);
        self.state.first_position = position;
        if let Some(slot) = self.state.window_slot_mut(position) {
            let slot_width = slot.width();
            if slot_width <= width {
                slot.offset((width - slot_width) / 2);
            }
        }
        self.fill_outward(position);
        if self.stack_from_end {
            self.correct_too_low();
        } else {
            self.correct_too_high();
        }
    }

    /// Anchors the selection near its previous left edge, shifted to
    /// satisfy the selection-pixel margins, and fills outward.
    pub(crate) fn fill_from_selection(
        &mut self,
        selected_left: i32,
        children_left: i32,
        children_right: i32,
    ) {
        let fading = self.fading_edge_length;
        let position = self.state.selected_position;
        let left_pixel = self.left_selection_pixel(children_left, fading, position);
        let right_pixel = self.right_selection_pixel(children_right, fading, position);

        self.make_and_attach(position, selected_left, true, true);
        self.state.first_position = position;
        if let Some(slot) = self.state.window_slot_mut(position) {
            if slot.right > right_pixel {
                let offset = (slot.left - left_pixel).min(slot.right - right_pixel);
                slot.offset(-offset);
            } else if slot.left < left_pixel {
                let offset = (left_pixel - slot.left).min(right_pixel - slot.right);
                slot.offset(offset);
            }
        }
        self.fill_outward(position);
        if self.stack_from_end {
            self.correct_too_low();
        } else {
            self.correct_too_high();
        }
    }

    /// Places `position` with its left edge at `left` and fills outward in
    /// both directions.
    pub(crate) fn fill_specific(&mut self, position: i32, left: i32) {
        let selected = position == self.state.selected_position;
        self.make_and_attach(position, left, true, selected);
        self.state.first_position = position;
        self.fill_outward(position);
        if self.state.window_len() > 0 {
            if self.stack_from_end {
                self.correct_too_low();
            } else {
                self.correct_too_high();
            }
        }
    }

    /// Incremental fill for [`LayoutIntent::MoveSelectionBy`]: reuses the
    /// previous anchor's neighbors instead of rebuilding the window, and
    /// clamps the shift to half the viewport to keep the motion readable.
    pub(crate) fn move_selection_fill(
        &mut self,
        old_sel_left: Option<i32>,
        new_sel_left: Option<i32>,
        delta: i32,
        children_left: i32,
        children_right: i32,
    ) {
        let fading = self.fading_edge_length;
        let position = self.state.selected_position;
        let left_pixel = self.left_selection_pixel(children_left, fading, position);
        let right_pixel = self.right_selection_pixel(children_right, fading, position);
        let divider = self.divider_width;
        let half_space = (children_right - children_left) / 2;

        if delta > 0 {
            // The old selection becomes the left neighbor of the new one.
            let old_left = old_sel_left.unwrap_or(children_left);
            self.make_and_attach(position - 1, old_left, true, false);
            self.state.first_position = position - 1;
            let anchor = self.window_right_of(position - 1).unwrap_or(old_left) + divider;
            self.make_and_attach(position, anchor, true, true);

            if let Some((left, right)) = self
                .state
                .window_slot(position)
                .map(|slot| (slot.left, slot.right))
            {
                if right > right_pixel {
                    let offset = (left - left_pixel)
                        .min(right - right_pixel)
                        .min(half_space);
                    self.state.offset_window(-offset);
                }
            }
            self.fill_outward_around_pair(position);
        } else if delta < 0 {
            match new_sel_left {
                Some(left) => self.make_and_attach(position, left, true, true),
                None => {
                    let right = old_sel_left.unwrap_or(children_left);
                    self.make_and_attach(position, right, false, true);
                }
            }
            self.state.first_position = position;
            if let Some((left, right)) = self
                .state
                .window_slot(position)
                .map(|slot| (slot.left, slot.right))
            {
                if left < left_pixel {
                    let offset = (left_pixel - left)
                        .min(right_pixel - right)
                        .min(half_space);
                    self.state.offset_window(offset);
                }
            }
            self.fill_outward(position);
        } else {
            let old_left = old_sel_left.unwrap_or(children_left);
            self.make_and_attach(position, old_left, true, true);
            self.state.first_position = position;
            if old_left < children_left {
                // The anchor was stuck off the leading edge.
                if let Some(slot) = self.state.window_slot_mut(position) {
                    if slot.right < children_left + STUCK_SELECTION_SLACK {
                        let shift = children_left - slot.left;
                        slot.offset(shift);
                    }
                }
            }
            self.fill_outward(position);
        }
    }

    /// Outward fill when both the anchor and its left neighbor are already
    /// attached (the `MoveSelectionBy` forward path).
    fn fill_outward_around_pair(&mut self, position: i32) {
        let divider = self.divider_width;
        if self.stack_from_end {
            if let Some(right) = self.window_right_of(position) {
                self.fill_right(position + 1, right + divider);
            }
            self.adjust_window();
            if let Some(left) = self.window_left_of(position - 1) {
                self.fill_left(position - 2, left - divider);
            }
        } else {
            if let Some(left) = self.window_left_of(position - 1) {
                self.fill_left(position - 2, left - divider);
            }
            self.adjust_window();
            if let Some(right) = self.window_right_of(position) {
                self.fill_right(position + 1, right + divider);
            }
        }
    }

    // =========================================================================
    // Selection-pixel margins
    // =========================================================================

    /// Leading limit for the selected slot: shrunk by the fading edge
    /// unless the selection is the first item.
    pub(crate) fn left_selection_pixel(
        &self,
        children_left: i32,
        fading_edge: i32,
        selected_position: i32,
    ) -> i32 {
        if selected_position > 0 {
            children_left + fading_edge
        } else {
            children_left
        }
    }

    /// Trailing limit for the selected slot: shrunk by the fading edge
    /// unless the selection is the last item.
    pub(crate) fn right_selection_pixel(
        &self,
        children_right: i32,
        fading_edge: i32,
        selected_position: i32,
    ) -> i32 {
        if selected_position != self.state.item_count - 1 {
            children_right - fading_edge
        } else {
            children_right
        }
    }

    // =========================================================================
    // Boundary correction
    // =========================================================================

    /// Closes the leading gap left when the window reaches the end of the
    /// collection short of the trailing edge.
    pub(crate) fn correct_too_high(&mut self) {
        let child_count = self.state.window_len();
        if child_count == 0 || self.state.last_position() != self.state.item_count - 1 {
            return;
        }
        let Some(last_right) = self.state.slots.last().map(|slot| slot.right) else {
            return;
        };
        let mut right_offset = self.list_right() - last_right;
        let Some(first_left) = self.state.slots.first().map(|slot| slot.left) else {
            return;
        };
        if right_offset > 0 && (self.state.first_position > 0 || first_left < self.list_left()) {
            if self.state.first_position == 0 {
                right_offset = right_offset.min(self.list_left() - first_left);
            }
            self.state.offset_window(right_offset);
            if self.state.first_position > 0 {
                let first_left = self.state.slots.first().map(|slot| slot.left).unwrap_or(0);
                self.fill_left(self.state.first_position - 1, first_left - self.divider_width);
                self.adjust_window();
            }
        }
    }

    /// Closes the trailing gap left when the window starts at position 0
    /// short of the leading edge.
    pub(crate) fn correct_too_low(&mut self) {
        let child_count = self.state.window_len();
        if self.state.first_position != 0 || child_count == 0 {
            return;
        }
        let end = self.list_right();
        let Some(first_left) = self.state.slots.first().map(|slot| slot.left) else {
            return;
        };
        let mut left_offset = first_left - self.list_left();
        let Some(last_right) = self.state.slots.last().map(|slot| slot.right) else {
            return;
        };
        let last_position = self.state.last_position();
        if left_offset <= 0 {
            return;
        }
        if last_position < self.state.item_count - 1 || last_right > end {
            if last_position == self.state.item_count - 1 {
                left_offset = left_offset.min(last_right - end);
            }
            self.state.offset_window(-left_offset);
            if last_position < self.state.item_count - 1 {
                let right = self.state.slots.last().map(|slot| slot.right).unwrap_or(0);
                self.fill_right(last_position + 1, right + self.divider_width);
                self.adjust_window();
            }
        } else if last_position == self.state.item_count - 1 {
            self.adjust_window();
        }
    }

    /// Pins the window to its natural edge: the leading edge normally, the
    /// trailing edge under `stack_from_end`.
    pub(crate) fn adjust_window(&mut self) {
        if self.state.slots.is_empty() {
            return;
        }
        let delta = if self.stack_from_end {
            let Some(last) = self.state.slots.last() else {
                return;
            };
            let mut delta = last.right - self.list_right();
            if self.state.first_position + self.state.window_len() < self.state.item_count {
                delta += self.divider_width;
            }
            delta.min(0)
        } else {
            let Some(first) = self.state.slots.first() else {
                return;
            };
            let mut delta = first.left - self.list_left();
            if self.state.first_position != 0 {
                delta -= self.divider_width;
            }
            delta.max(0)
        };
        if delta != 0 {
            self.state.offset_window(-delta);
        }
    }

    // =========================================================================
    // The layout pass
    // =========================================================================

    /// Runs one layout pass, deferring and coalescing nested requests.
    pub(crate) fn layout_pass(&mut self) {
        if self.state.in_layout {
            self.state.deferred_layout = true;
            return;
        }
        self.state.in_layout = true;
        self.layout_pass_inner();
        self.state.in_layout = false;
        self.state.layout_dirty = false;
        if self.state.deferred_layout {
            self.state.deferred_layout = false;
            self.layout_pass();
        }
    }

    fn layout_pass_inner(&mut self) {
        let Some(adapter) = self.adapter.clone() else {
            self.reset_window();
            self.check_selection_changed();
            self.sync_visible_range();
            return;
        };

        let children_left = self.list_left();
        let children_right = self.list_right();

        // Anchors from the old window, captured before it is torn down.
        let child_count = self.state.window_len();
        let selected_index = self.state.selected_position - self.state.first_position;
        let old_sel_left = self
            .state
            .window_slot(self.state.selected_position)
            .map(|slot| slot.left);
        let old_first_left = self.state.slots.first().map(|slot| slot.left);
        let new_sel_left = match self.state.intent {
            LayoutIntent::SyncWithSelection => self
                .state
                .window_slot(self.state.next_selected_position)
                .map(|slot| slot.left),
            LayoutIntent::MoveSelectionBy { delta } => {
                let index = selected_index + delta;
                if index >= 0 && index < child_count {
                    self.state.slots.get(index as usize).map(|slot| slot.left)
                } else {
                    None
                }
            }
            _ => None,
        };

        if self.state.data_changed {
            self.handle_data_changed();
        }

        if self.state.item_count == 0 {
            self.reset_window();
            self.check_selection_changed();
            self.sync_visible_range();
            return;
        }
        if self.state.item_count != adapter.count() as i32 {
            adapter_contract_violation(self.state.item_count, adapter.count());
        }
        let pending = self.state.next_selected_position;
        if pending < NO_POSITION || pending >= self.state.item_count {
            selection_contract_violation(pending, self.state.item_count);
        }

        self.set_selected_position_int(pending);

        // Tear the old window down into the recycler. During a data-change
        // pass slots stay indexed by their old positions so unchanged rows
        // can reclaim them.
        let data_changed = self.state.data_changed;
        let drained: Vec<Slot> = self.state.slots.drain(..).collect();
        if data_changed {
            for slot in drained {
                self.recycler.track_active(slot);
            }
        } else {
            for slot in drained {
                self.recycler.release(slot);
            }
        }

        let intent = std::mem::take(&mut self.state.intent);
        trace!(?intent, item_count = self.state.item_count, "layout pass");
        match intent {
            LayoutIntent::ForceLeftAlign => {
                self.state.first_position = 0;
                self.fill_from_left(children_left);
                self.adjust_window();
            }
            LayoutIntent::ForceRightAlign => {
                self.fill_left(self.state.item_count - 1, children_right);
                self.adjust_window();
            }
            LayoutIntent::SyncWithSelection => match new_sel_left {
                Some(left) => self.fill_from_selection(left, children_left, children_right),
                None => self.fill_from_middle(children_left, children_right),
            },
            LayoutIntent::SpecificPosition { position, left } => {
                let position = if position >= 0 && position < self.state.item_count {
                    position
                } else {
                    self.reconcile_selected_position()
                };
                self.fill_specific(position, left);
            }
            LayoutIntent::SyncAfterDataChange { position, id } => {
                debug!(position, id, "re-anchoring after data change");
                self.fill_specific(position, self.state.sync_left);
            }
            LayoutIntent::MoveSelectionBy { delta } => {
                self.move_selection_fill(
                    old_sel_left,
                    new_sel_left,
                    delta,
                    children_left,
                    children_right,
                );
            }
            LayoutIntent::None => {
                if child_count == 0 {
                    if self.stack_from_end {
                        let position =
                            self.look_for_selectable_position(self.state.item_count - 1, false);
                        self.set_selected_position_int(position);
                        self.fill_left(self.state.item_count - 1, children_right);
                    } else {
                        let position = self.look_for_selectable_position(0, true);
                        self.set_selected_position_int(position);
                        self.fill_from_left(children_left);
                        self.adjust_window();
                    }
                } else if self.state.selected_position >= 0
                    && self.state.selected_position < self.state.item_count
                {
                    let position = self.state.selected_position;
                    self.fill_specific(position, old_sel_left.unwrap_or(children_left));
                } else if self.state.first_position < self.state.item_count {
                    let position = self.state.first_position;
                    self.fill_specific(position, old_first_left.unwrap_or(children_left));
                } else {
                    self.fill_specific(0, children_left);
                }
            }
        }

        // Any active slot not reclaimed by position falls back to the pools.
        self.recycler.scrap_active();
        self.state.debug_check_window();

        if let Some(slot) = self.state.window_slot(self.state.selected_position) {
            self.state.selected_left = slot.left;
        }
        self.state.data_changed = false;
        self.state.need_sync = false;
        let committed = self.state.selected_position;
        self.set_next_selected_position_int(committed);
        if self.state.item_count > 0 {
            self.check_selection_changed();
        }
        self.validate_focus();
        self.sync_visible_range();
    }

    // =========================================================================
    // Data-change resolution
    // =========================================================================

    /// Resolves the sync target recorded at change time into a concrete
    /// position and intent.
    pub(crate) fn handle_data_changed(&mut self) {
        let count = self.state.item_count;
        debug!(
            old_count = self.state.old_item_count,
            count, "resolving data change"
        );
        if count > 0 {
            if self.state.need_sync {
                self.state.need_sync = false;
                match self.state.sync_mode {
                    SyncMode::Selection => {
                        let new_pos = self.find_sync_position();
                        if new_pos >= 0
                            && self.look_for_selectable_position(new_pos, true) == new_pos
                        {
                            self.set_next_selected_position_int(new_pos);
                            self.state.sync_position = new_pos;
                            self.state.intent = LayoutIntent::SyncAfterDataChange {
                                position: new_pos,
                                id: self.state.sync_id,
                            };
                            return;
                        }
                    }
                    SyncMode::FirstVisible => {
                        let position = self.state.sync_position.clamp(0, count - 1);
                        self.state.intent = LayoutIntent::SyncAfterDataChange {
                            position,
                            id: self.state.sync_id,
                        };
                        return;
                    }
                }
            }
            // No usable sync point: keep a selection near the old one.
            let mut new_pos = self.state.next_selected_position;
            if new_pos >= count {
                new_pos = count - 1;
            }
            if new_pos < 0 {
                new_pos = 0;
            }
            let mut selectable = self.look_for_selectable_position(new_pos, true);
            if selectable < 0 {
                selectable = self.look_for_selectable_position(new_pos, false);
            }
            if selectable >= 0 {
                self.set_next_selected_position_int(selectable);
                return;
            }
        }
        // Nothing left to select.
        self.state.selected_position = NO_POSITION;
        self.state.selected_id = i64::MIN;
        self.state.next_selected_position = NO_POSITION;
        self.state.next_selected_id = i64::MIN;
        self.state.need_sync = false;
        self.check_selection_changed();
    }

    /// Searches outward from the remembered position for the row carrying
    /// the remembered stable id.
    pub(crate) fn find_sync_position(&self) -> i32 {
        let count = self.state.item_count;
        if count == 0 {
            return NO_POSITION;
        }
        let id = self.state.sync_id;
        if id == i64::MIN {
            return NO_POSITION;
        }
        let Some(adapter) = self.adapter.as_ref() else {
            return NO_POSITION;
        };
        let seed = self.state.sync_position.clamp(0, count - 1);
        if !adapter.has_stable_ids() {
            return seed;
        }
        if adapter.stable_id(seed as usize) == id {
            return seed;
        }
        let mut radius = 1;
        loop {
            let down = seed + radius;
            let up = seed - radius;
            let mut progressed = false;
            if down < count {
                progressed = true;
                if adapter.stable_id(down as usize) == id {
                    return down;
                }
            }
            if up >= 0 {
                progressed = true;
                if adapter.stable_id(up as usize) == id {
                    return up;
                }
            }
            if !progressed {
                return NO_POSITION;
            }
            radius += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::adapter::{KindId, StripItem, VecAdapter};
    use crate::strip::{LayoutIntent, StripView, NO_POSITION};

    fn uniform_strip(count: usize, width: i32, viewport: i32) -> (StripView, Arc<VecAdapter>) {
        let adapter = Arc::new(VecAdapter::with_uniform_width(count, width));
        let mut strip = StripView::new(viewport);
        strip.set_adapter(Some(adapter.clone()));
        (strip, adapter)
    }

    fn positions(strip: &StripView) -> Vec<i32> {
        strip.slots().iter().map(|slot| slot.position).collect()
    }

    #[test]
    fn test_initial_fill_is_contiguous_within_bounds() {
        let (strip, _) = uniform_strip(10, 100, 400);
        assert_eq!(positions(&strip), vec![0, 1, 2, 3]);
        let first = strip.first_visible_position();
        assert!(first >= 0);
        assert!(first + strip.window_len() as i32 - 1 < 10);
        for pair in strip.slots().windows(2) {
            assert_eq!(pair[0].right, pair[1].left, "no gaps, no overlaps");
        }
    }

    #[test]
    fn test_divider_occupies_layout_space() {
        let adapter = Arc::new(VecAdapter::with_uniform_width(10, 100));
        let mut strip = StripView::new(400).with_divider_width(10);
        strip.set_adapter(Some(adapter));
        // 100 + 10 + 100 + 10 + 100 + 10 = 330; a fourth item starts at 330.
        assert_eq!(positions(&strip), vec![0, 1, 2, 3]);
        assert_eq!(strip.visible_slot(1).unwrap().left, 110);
        assert_eq!(strip.visible_slot(3).unwrap().left, 330);
    }

    #[test]
    fn test_relayout_is_idempotent() {
        let (mut strip, _) = uniform_strip(10, 100, 400);
        strip.set_selection(5);
        let before: Vec<(i32, i32, i32)> = strip
            .slots()
            .iter()
            .map(|s| (s.position, s.left, s.right))
            .collect();
        strip.request_relayout();
        strip.request_relayout();
        let after: Vec<(i32, i32, i32)> = strip
            .slots()
            .iter()
            .map(|s| (s.position, s.left, s.right))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_force_right_align_pins_last_item() {
        let (mut strip, _) = uniform_strip(10, 100, 400);
        strip.state.intent = LayoutIntent::ForceRightAlign;
        strip.request_relayout();
        assert_eq!(strip.last_visible_position(), 9);
        assert_eq!(strip.visible_slot(9).unwrap().right, 400);
    }

    #[test]
    fn test_fill_specific_reanchors_and_corrects_overshoot() {
        let (mut strip, _) = uniform_strip(10, 100, 400);
        // Anchoring the last item at the viewport's left edge leaves the
        // trailing half of the viewport empty; correction must back-fill.
        strip.set_selection_from_anchor(9, 0);
        assert_eq!(strip.selected_position(), 9);
        assert_eq!(strip.visible_slot(9).unwrap().right, 400);
        assert_eq!(positions(&strip), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_window_shorter_than_viewport() {
        let (strip, _) = uniform_strip(2, 100, 400);
        assert_eq!(positions(&strip), vec![0, 1]);
        assert_eq!(strip.visible_slot(0).unwrap().left, 0);
    }

    #[test]
    fn test_empty_adapter_resets_selection() {
        let (strip, _) = uniform_strip(0, 100, 400);
        assert_eq!(strip.window_len(), 0);
        assert_eq!(strip.selected_position(), NO_POSITION);
    }

    #[test]
    fn test_slots_recycled_across_passes() {
        let (mut strip, _) = uniform_strip(100, 100, 400);
        let ids_before: Vec<_> = strip.slots().iter().map(|s| s.id()).collect();
        // Jump far away: the rebuilt window must reuse the pooled slots.
        strip.set_selection_from_anchor(50, 0);
        let ids_after: Vec<_> = strip.slots().iter().map(|s| s.id()).collect();
        for id in &ids_after {
            assert!(ids_before.contains(id), "window rebuilt from the pool");
        }
        assert_eq!(positions(&strip), vec![50, 51, 52, 53]);
    }

    #[test]
    fn test_rebound_slot_position_is_fresh() {
        let (mut strip, _) = uniform_strip(100, 100, 400);
        strip.set_selection_from_anchor(50, 0);
        for slot in strip.slots() {
            assert_eq!(
                slot.position,
                strip.first_visible_position()
                    + strip
                        .slots()
                        .iter()
                        .position(|s| s.id() == slot.id())
                        .unwrap() as i32
            );
        }
    }

    #[test]
    fn test_mixed_kinds_pool_separately() {
        let items: Vec<StripItem> = (0..40)
            .map(|i| StripItem::new(100).with_kind(KindId(i % 2)))
            .collect();
        let adapter = Arc::new(VecAdapter::new(items));
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(adapter));
        strip.set_selection_from_anchor(20, 0);
        for slot in strip.slots() {
            assert_eq!(slot.kind, KindId(slot.position % 2));
        }
    }

    #[test]
    fn test_data_change_without_notification_is_fatal() {
        let (mut strip, adapter) = uniform_strip(10, 100, 400);
        adapter.push(StripItem::new(100));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            strip.request_relayout();
        }));
        assert!(result.is_err(), "silent count change must fail fast");
    }

    #[test]
    fn test_notified_growth_keeps_anchor() {
        let (mut strip, adapter) = uniform_strip(10, 100, 400);
        strip.set_selection(2);
        adapter.insert(0, StripItem::new(100));
        strip.notify_changed();
        // Without stable ids the engine re-anchors by position.
        assert_eq!(strip.selected_position(), 2);
        assert!(strip.visible_slot(2).is_some());
    }

    #[test]
    fn test_notified_shrink_clamps_selection() {
        let (mut strip, adapter) = uniform_strip(10, 100, 400);
        strip.set_selection(9);
        for _ in 0..8 {
            adapter.remove(adapter.len() - 1);
        }
        strip.notify_changed();
        assert_eq!(strip.selected_position(), 1);
        assert_eq!(strip.last_visible_position(), 1);
    }

    #[test]
    fn test_stable_id_sync_follows_moved_row() {
        let items: Vec<StripItem> = (0..10)
            .map(|i| StripItem::new(100).with_id(i as i64 * 10))
            .collect();
        let adapter = Arc::new(VecAdapter::new(items).with_stable_ids());
        let mut strip = StripView::new(400);
        strip.set_adapter(Some(adapter.clone()));
        strip.set_selection(4); // id 40
        adapter.insert(0, StripItem::new(100).with_id(999));
        adapter.insert(0, StripItem::new(100).with_id(998));
        strip.notify_changed();
        assert_eq!(strip.selected_position(), 6, "row with id 40 moved to 6");
        assert_eq!(strip.selected_id(), 40);
    }

    #[test]
    fn test_shrink_to_empty_clears_selection() {
        let (mut strip, adapter) = uniform_strip(3, 100, 400);
        for _ in 0..3 {
            adapter.remove(0);
        }
        strip.notify_changed();
        assert_eq!(strip.selected_position(), NO_POSITION);
        assert_eq!(strip.window_len(), 0);
    }

    #[test]
    fn test_active_slots_reclaimed_by_position() {
        let (mut strip, adapter) = uniform_strip(10, 100, 400);
        let id_of_2 = strip.visible_slot(2).unwrap().id();
        // Append far away; visible positions keep their content.
        adapter.push(StripItem::new(100));
        strip.notify_changed();
        assert_eq!(
            strip.visible_slot(2).unwrap().id(),
            id_of_2,
            "unchanged position reclaims its old slot"
        );
    }
}
