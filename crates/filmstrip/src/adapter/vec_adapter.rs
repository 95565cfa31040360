//! Vector-backed adapter for hosts and tests.

use parking_lot::RwLock;

use super::traits::{FocusSpan, KindId, StripAdapter};

/// One item of a [`VecAdapter`].
#[derive(Debug, Clone)]
pub struct StripItem {
    /// Measured width in pixels.
    pub width: i32,
    /// Recycling kind.
    pub kind: KindId,
    /// Whether the item is selectable.
    pub enabled: bool,
    /// Stable identity (meaningful when the adapter reports stable ids).
    pub id: i64,
    /// Focusable sub-element spans.
    pub focus_spans: Vec<FocusSpan>,
}

impl StripItem {
    /// Creates an enabled, default-kind item of the given width.
    pub fn new(width: i32) -> Self {
        Self {
            width,
            kind: KindId::DEFAULT,
            enabled: true,
            id: 0,
            focus_spans: Vec::new(),
        }
    }

    /// Sets the recycling kind.
    pub fn with_kind(mut self, kind: KindId) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the stable id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Sets the focusable spans.
    pub fn with_focus_spans(mut self, spans: Vec<FocusSpan>) -> Self {
        self.focus_spans = spans;
        self
    }
}

/// A [`StripAdapter`] backed by a vector of [`StripItem`]s.
///
/// Items are held behind a lock so hosts can mutate the collection while
/// the engine keeps a shared handle; after any mutation the host must call
/// [`StripView::notify_changed`](crate::strip::StripView::notify_changed)
/// before the next layout pass.
///
/// # Example
///
/// ```
/// use filmstrip::adapter::{StripItem, VecAdapter};
///
/// let adapter = VecAdapter::new(vec![
///     StripItem::new(120),
///     StripItem::new(80).with_enabled(false),
///     StripItem::new(200),
/// ]);
/// assert_eq!(filmstrip::StripAdapter::count(&adapter), 3);
/// ```
pub struct VecAdapter {
    items: RwLock<Vec<StripItem>>,
    kind_count: usize,
    stable_ids: bool,
}

impl VecAdapter {
    /// Creates an adapter over the given items.
    ///
    /// The kind-pool count is derived from the largest recyclable kind
    /// present (at least 1).
    pub fn new(items: Vec<StripItem>) -> Self {
        let kind_count = items
            .iter()
            .filter(|item| item.kind.is_recyclable())
            .map(|item| item.kind.0 as usize + 1)
            .max()
            .unwrap_or(1)
            .max(1);
        Self {
            items: RwLock::new(items),
            kind_count,
            stable_ids: false,
        }
    }

    /// Creates an adapter with `count` items of uniform `width`.
    pub fn with_uniform_width(count: usize, width: i32) -> Self {
        Self::new((0..count).map(|_| StripItem::new(width)).collect())
    }

    /// Marks the adapter's item ids as stable across data changes.
    pub fn with_stable_ids(mut self) -> Self {
        self.stable_ids = true;
        self
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the adapter holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Appends an item.
    pub fn push(&self, item: StripItem) {
        self.items.write().push(item);
    }

    /// Inserts an item at `position`.
    pub fn insert(&self, position: usize, item: StripItem) {
        self.items.write().insert(position, item);
    }

    /// Removes and returns the item at `position`.
    pub fn remove(&self, position: usize) -> StripItem {
        self.items.write().remove(position)
    }

    /// Sets the enabled flag of the item at `position`.
    pub fn set_enabled(&self, position: usize, enabled: bool) {
        self.items.write()[position].enabled = enabled;
    }

    /// Sets the width of the item at `position`.
    pub fn set_width(&self, position: usize, width: i32) {
        self.items.write()[position].width = width;
    }
}

impl StripAdapter for VecAdapter {
    fn count(&self) -> usize {
        self.items.read().len()
    }

    fn item_width(&self, position: usize) -> i32 {
        self.items.read()[position].width
    }

    fn kind_of(&self, position: usize) -> KindId {
        self.items.read()[position].kind
    }

    fn kind_count(&self) -> usize {
        self.kind_count
    }

    fn is_enabled(&self, position: usize) -> bool {
        self.items.read()[position].enabled
    }

    fn all_enabled(&self) -> bool {
        self.items.read().iter().all(|item| item.enabled)
    }

    fn stable_id(&self, position: usize) -> i64 {
        let items = self.items.read();
        if self.stable_ids {
            items[position].id
        } else {
            position as i64
        }
    }

    fn has_stable_ids(&self) -> bool {
        self.stable_ids
    }

    fn focus_spans(&self, position: usize) -> Vec<FocusSpan> {
        self.items.read()[position].focus_spans.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_adapter() {
        let adapter = VecAdapter::with_uniform_width(4, 64);
        assert_eq!(adapter.count(), 4);
        assert_eq!(adapter.item_width(3), 64);
        assert!(adapter.all_enabled());
    }

    #[test]
    fn test_kind_count_derived_from_items() {
        let adapter = VecAdapter::new(vec![
            StripItem::new(10),
            StripItem::new(10).with_kind(KindId(2)),
            StripItem::new(10).with_kind(KindId::FIXED),
        ]);
        assert_eq!(adapter.kind_count(), 3);
    }

    #[test]
    fn test_disabled_item_clears_all_enabled() {
        let adapter = VecAdapter::new(vec![
            StripItem::new(10),
            StripItem::new(10).with_enabled(false),
        ]);
        assert!(!adapter.all_enabled());
        assert!(adapter.is_enabled(0));
        assert!(!adapter.is_enabled(1));

        adapter.set_enabled(1, true);
        assert!(adapter.all_enabled());
    }

    #[test]
    fn test_stable_ids_opt_in() {
        let plain = VecAdapter::new(vec![StripItem::new(10).with_id(99)]);
        assert_eq!(plain.stable_id(0), 0, "ids fall back to position");

        let stable = VecAdapter::new(vec![StripItem::new(10).with_id(99)]).with_stable_ids();
        assert!(stable.has_stable_ids());
        assert_eq!(stable.stable_id(0), 99);
    }

    #[test]
    fn test_mutation_through_shared_handle() {
        let adapter = VecAdapter::with_uniform_width(2, 10);
        adapter.push(StripItem::new(30));
        assert_eq!(adapter.count(), 3);
        let removed = adapter.remove(0);
        assert_eq!(removed.width, 10);
        assert_eq!(adapter.count(), 2);
    }
}
