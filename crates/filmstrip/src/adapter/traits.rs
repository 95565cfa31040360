//! The capability contract between the engine and its data source.

/// The recycling category of a position.
///
/// Slots detached from the window are pooled by kind and only reused for
/// positions of the same kind. Kinds below zero are never pooled; a fresh
/// slot is materialized for them every time they enter the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(pub i32);

impl KindId {
    /// The default kind for adapters with a single slot shape.
    pub const DEFAULT: Self = Self(0);

    /// The kind reserved for fixed (header/footer) items.
    ///
    /// Fixed items wrap host-supplied one-off content, so their slots are
    /// dropped instead of pooled when they leave the window.
    pub const FIXED: Self = Self(-2);

    /// Whether slots of this kind may be returned to the pool.
    #[inline]
    pub fn is_recyclable(self) -> bool {
        self.0 >= 0
    }
}

/// A focusable sub-element within an item, as a horizontal span relative
/// to the item's left edge.
///
/// Hosts whose items contain internal focusable elements (buttons, fields)
/// report them here; arrow navigation can then move focus between spans
/// before giving up and moving the selection. Spans must satisfy
/// `0 <= left <= right <= item_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSpan {
    /// Left edge, relative to the item's left edge.
    pub left: i32,
    /// Right edge, relative to the item's left edge.
    pub right: i32,
}

impl FocusSpan {
    /// Creates a span from relative edges.
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }
}

/// The capability contract the strip engine consumes.
///
/// Positions are `0..count()`. The collection may change only between
/// layout passes; after a change the host must call
/// [`StripView::notify_changed`](crate::strip::StripView::notify_changed)
/// on the engine's owning thread before the next layout pass runs. The
/// engine treats a silently changed `count()` as a caller contract
/// violation and fails fast.
///
/// # Implementation Requirements
///
/// At minimum, implement [`count`](Self::count) and
/// [`item_width`](Self::item_width); every other method has a default for
/// the common single-kind, everything-enabled case.
///
/// # Example
///
/// ```
/// use filmstrip::adapter::StripAdapter;
///
/// struct Squares;
///
/// impl StripAdapter for Squares {
///     fn count(&self) -> usize {
///         64
///     }
///
///     fn item_width(&self, _position: usize) -> i32 {
///         48
///     }
/// }
/// ```
pub trait StripAdapter: Send + Sync {
    /// Number of items in the collection.
    fn count(&self) -> usize;

    /// Measured width in pixels of the item at `position`.
    ///
    /// This is the headless analog of measuring a view: the engine calls it
    /// when a slot is materialized or rebound, never while the slot is
    /// attached.
    fn item_width(&self, position: usize) -> i32;

    /// The recycling kind of the item at `position`.
    fn kind_of(&self, _position: usize) -> KindId {
        KindId::DEFAULT
    }

    /// Number of distinct recyclable kinds this adapter produces.
    ///
    /// Used to size the recycler's per-kind pools. Must be at least 1 and
    /// must not change over the adapter's lifetime.
    fn kind_count(&self) -> usize {
        1
    }

    /// Whether the item at `position` is enabled (selectable).
    fn is_enabled(&self, _position: usize) -> bool {
        true
    }

    /// Whether every item is enabled.
    ///
    /// When `true`, selectable-position scans skip the per-position
    /// `is_enabled` calls entirely.
    fn all_enabled(&self) -> bool {
        true
    }

    /// Stable identity of the item at `position`.
    ///
    /// Only meaningful when [`has_stable_ids`](Self::has_stable_ids)
    /// returns `true`; the engine then uses it to re-find the selected row
    /// after a data change.
    fn stable_id(&self, position: usize) -> i64 {
        position as i64
    }

    /// Whether [`stable_id`](Self::stable_id) values survive data changes.
    fn has_stable_ids(&self) -> bool {
        false
    }

    /// Focusable sub-element spans of the item at `position`, in
    /// left-to-right order.
    fn focus_spans(&self, _position: usize) -> Vec<FocusSpan> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_recyclability() {
        assert!(KindId::DEFAULT.is_recyclable());
        assert!(KindId(3).is_recyclable());
        assert!(!KindId::FIXED.is_recyclable());
        assert!(!KindId(-1).is_recyclable());
    }

    #[test]
    fn test_trait_defaults() {
        struct Minimal;
        impl StripAdapter for Minimal {
            fn count(&self) -> usize {
                5
            }
            fn item_width(&self, _position: usize) -> i32 {
                10
            }
        }

        let a = Minimal;
        assert_eq!(a.kind_count(), 1);
        assert_eq!(a.kind_of(3), KindId::DEFAULT);
        assert!(a.is_enabled(4));
        assert!(a.all_enabled());
        assert!(!a.has_stable_ids());
        assert_eq!(a.stable_id(2), 2);
        assert!(a.focus_spans(0).is_empty());
    }
}
