//! Layout intents.

/// The single pending directive consumed by the next layout pass.
///
/// Exactly one intent is active at a time. Setting a new intent supersedes
/// the previous one (at most one positioning action is ever outstanding),
/// and the layout pass consumes the active intent exactly once, resetting
/// it to [`None`](LayoutIntent::None) before filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutIntent {
    /// No directive: re-anchor at the previous selection or first
    /// position, or perform an initial fill when the window is empty.
    #[default]
    None,
    /// Anchor position 0 at the leading edge.
    ForceLeftAlign,
    /// Anchor the last position at the trailing edge.
    ForceRightAlign,
    /// Bring the pending selection into view, honoring the selection-pixel
    /// margins.
    SyncWithSelection,
    /// Place `position`'s left edge at `left` and fill outward.
    SpecificPosition {
        /// The position to anchor.
        position: i32,
        /// Viewport-relative left edge for the anchor.
        left: i32,
    },
    /// Restore `position` after a data change, at the span remembered when
    /// the change was recorded.
    SyncAfterDataChange {
        /// The resolved post-change position.
        position: i32,
        /// The stable id the position was resolved from (diagnostic).
        id: i64,
    },
    /// Move the selection incrementally by `delta` positions, reusing the
    /// previous anchor's neighbors instead of rebuilding the window.
    MoveSelectionBy {
        /// Signed position delta.
        delta: i32,
    },
}

impl LayoutIntent {
    /// Whether this is the empty intent.
    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, LayoutIntent::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert!(LayoutIntent::default().is_none());
        assert!(!LayoutIntent::ForceLeftAlign.is_none());
    }
}
