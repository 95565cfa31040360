//! Focus search within the window's slots.
//!
//! When slots carry focusable sub-elements ([`FocusSpan`]s) and the view
//! has [`items_can_focus`](StripView::items_can_focus) enabled, arrow
//! navigation first offers the step to the focus system: candidates are
//! the spans of the attached slots, walked as an explicit ordered
//! sequence and scored by the same axis-distance function in every search
//! path. A focus move wins over a selection move when its required scroll
//! amount stays inside the per-gesture maximum.
//!
//! [`FocusSpan`]: crate::adapter::FocusSpan

use super::view::StripView;
use super::{Direction, NO_POSITION};

/// A focusable sub-element of an attached slot: the slot's position plus
/// the index into its focus spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    /// Position of the slot owning the span.
    pub position: i32,
    /// Index into the slot's focus spans.
    pub span: usize,
}

/// Outcome of a focus-first arrow step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrowFocusResult {
    pub(crate) position: i32,
    pub(crate) amount: i32,
}

impl StripView {
    /// Tries to resolve an arrow step as a focus move.
    ///
    /// Returns the target's owning position and the scroll amount that
    /// brings it into view, or `None` when selection movement should win:
    /// no candidate exists, a selectable position sits before the
    /// candidate in the travel direction, or the candidate is too far to
    /// reach within the per-gesture scroll cap.
    pub(crate) fn arrow_scroll_focused(&mut self, direction: Direction) -> Option<ArrowFocusResult> {
        let selected = self
            .state
            .window_slot(self.state.selected_position)
            .map(|slot| (slot.position, slot.left, slot.right));

        let from_focus = match (selected, self.focused) {
            (Some((position, _, _)), Some(target)) => target.position == position,
            _ => false,
        };

        let target = if from_focus {
            let current = self.focused?;
            let (current_left, current_right) = self.target_abs(current)?;
            self.next_focus_target(current, current_left, current_right, direction)
        } else {
            // No owned focus: search from the unfaded viewport edge, or
            // from the selected slot's near edge when it sits inside it.
            let search_x = match direction {
                Direction::Right => {
                    let mut edge = self.list_left();
                    if self.state.first_position > 0 {
                        edge += self.arrow_scroll_preview_length();
                    }
                    match selected {
                        Some((_, left, _)) if left > edge => left,
                        _ => edge,
                    }
                }
                Direction::Left => {
                    let mut edge = self.list_right();
                    if self.state.last_position() < self.state.item_count - 1 {
                        edge -= self.arrow_scroll_preview_length();
                    }
                    match selected {
                        Some((_, _, right)) if right < edge => right,
                        _ => edge,
                    }
                }
            };
            self.focus_target_from_point(search_x, direction)
        }?;

        // A selectable position strictly before the focus candidate takes
        // priority: selection movement handles that step instead.
        if self.state.selected_position != NO_POSITION
            && target.position != self.state.selected_position
        {
            let selectable = self.look_for_selectable_position_on_screen(direction);
            if selectable != NO_POSITION
                && ((direction == Direction::Right && selectable < target.position)
                    || (direction == Direction::Left && selectable > target.position))
            {
                return None;
            }
        }

        let amount = self.amount_to_scroll_to_focus(direction, target);
        let max_scroll = self.max_scroll_amount();
        if amount < max_scroll {
            self.focused = Some(target);
            Some(ArrowFocusResult {
                position: target.position,
                amount,
            })
        } else if self.distance_to_target(target) < max_scroll {
            // Reachable this gesture even if the preview goal is not.
            self.focused = Some(target);
            Some(ArrowFocusResult {
                position: target.position,
                amount: max_scroll,
            })
        } else {
            None
        }
    }

    /// The next focus span after the currently focused one, in window
    /// order along `direction`.
    fn next_focus_target(
        &self,
        current: FocusTarget,
        current_left: i32,
        current_right: i32,
        direction: Direction,
    ) -> Option<FocusTarget> {
        let mut best: Option<(FocusTarget, i32)> = None;
        for (candidate, left, right) in self.focus_candidates() {
            if candidate == current {
                continue;
            }
            match direction {
                Direction::Right => {
                    if left > current_left {
                        let score = left - current_left;
                        if best.map_or(true, |(_, s)| score < s) {
                            best = Some((candidate, score));
                        }
                    }
                }
                Direction::Left => {
                    if right < current_right {
                        let score = current_right - right;
                        if best.map_or(true, |(_, s)| score < s) {
                            best = Some((candidate, score));
                        }
                    }
                }
            }
        }
        best.map(|(target, _)| target)
    }

    /// The focus span nearest to `x` along `direction`, scored with the
    /// same distance function as the from-focus search.
    fn focus_target_from_point(&self, x: i32, direction: Direction) -> Option<FocusTarget> {
        let mut best: Option<(FocusTarget, i32)> = None;
        for (candidate, left, right) in self.focus_candidates() {
            match direction {
                Direction::Right => {
                    if left >= x {
                        let score = left - x;
                        if best.map_or(true, |(_, s)| score < s) {
                            best = Some((candidate, score));
                        }
                    }
                }
                Direction::Left => {
                    if right <= x {
                        let score = x - right;
                        if best.map_or(true, |(_, s)| score < s) {
                            best = Some((candidate, score));
                        }
                    }
                }
            }
        }
        best.map(|(target, _)| target)
    }

    /// All focusable candidates in the window, leftmost slot first, with
    /// their absolute spans.
    fn focus_candidates(&self) -> Vec<(FocusTarget, i32, i32)> {
        let mut candidates = Vec::new();
        for slot in &self.state.slots {
            for span in 0..slot.focus_spans.len() {
                if let Some((left, right)) = slot.focus_span_abs(span) {
                    candidates.push((
                        FocusTarget {
                            position: slot.position,
                            span,
                        },
                        left,
                        right,
                    ));
                }
            }
        }
        candidates
    }

    /// Absolute span of a focus target, if its slot is attached and the
    /// span index is still valid.
    pub(crate) fn target_abs(&self, target: FocusTarget) -> Option<(i32, i32)> {
        self.state
            .window_slot(target.position)
            .and_then(|slot| slot.focus_span_abs(target.span))
    }

    /// Pixels needed to bring a focus target into view, including the
    /// preview margin away from collection boundaries.
    pub(crate) fn amount_to_scroll_to_focus(&self, direction: Direction, target: FocusTarget) -> i32 {
        let Some((left, right)) = self.target_abs(target) else {
            return 0;
        };
        match direction {
            Direction::Right => {
                let list_right = self.list_right();
                if right <= list_right {
                    0
                } else {
                    let amount = right - list_right;
                    if target.position < self.state.item_count - 1 {
                        amount + self.arrow_scroll_preview_length()
                    } else {
                        amount
                    }
                }
            }
            Direction::Left => {
                let list_left = self.list_left();
                if left >= list_left {
                    0
                } else {
                    let amount = list_left - left;
                    if target.position > 0 {
                        amount + self.arrow_scroll_preview_length()
                    } else {
                        amount
                    }
                }
            }
        }
    }

    /// Axis distance from a focus target to the visible slot area; zero
    /// when any part of it is visible.
    pub(crate) fn distance_to_target(&self, target: FocusTarget) -> i32 {
        let Some((left, right)) = self.target_abs(target) else {
            return 0;
        };
        if right < self.list_left() {
            self.list_left() - right
        } else if left > self.list_right() {
            left - self.list_right()
        } else {
            0
        }
    }

    /// The nearest enabled position within the window in `direction`,
    /// starting just past the selection.
    pub(crate) fn look_for_selectable_position_on_screen(&self, direction: Direction) -> i32 {
        let Some(adapter) = self.adapter.as_ref() else {
            return NO_POSITION;
        };
        let first = self.state.first_position;
        match direction {
            Direction::Right => {
                let start = if self.state.selected_position != NO_POSITION {
                    self.state.selected_position + 1
                } else {
                    first
                };
                if start >= self.state.item_count {
                    return NO_POSITION;
                }
                let mut position = start.max(first);
                let last_visible = self.state.last_position();
                while position <= last_visible {
                    if adapter.is_enabled(position as usize) {
                        return position;
                    }
                    position += 1;
                }
                NO_POSITION
            }
            Direction::Left => {
                let last = self.state.last_position();
                let start = if self.state.selected_position != NO_POSITION {
                    self.state.selected_position - 1
                } else {
                    last
                };
                if start < 0 || start >= self.state.item_count {
                    return NO_POSITION;
                }
                let mut position = start.min(last);
                while position >= first {
                    if adapter.is_enabled(position as usize) {
                        return position;
                    }
                    position -= 1;
                }
                NO_POSITION
            }
        }
    }

    /// Drops a focus target whose slot left the window or whose span no
    /// longer exists after a rebind.
    pub(crate) fn validate_focus(&mut self) {
        if let Some(target) = self.focused {
            if self.target_abs(target).is_none() {
                self.focused = None;
            }
        }
    }
}
