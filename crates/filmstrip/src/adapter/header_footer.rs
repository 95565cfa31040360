//! Decorator adapter for fixed leading and trailing items.

use std::sync::Arc;

use super::traits::{FocusSpan, KindId, StripAdapter};

/// A fixed item composed around a wrapped adapter's collection.
#[derive(Debug, Clone)]
pub struct FixedItem {
    /// Measured width in pixels.
    pub width: i32,
    /// Whether the fixed item participates in selection.
    pub selectable: bool,
    /// Focusable sub-element spans.
    pub focus_spans: Vec<FocusSpan>,
}

impl FixedItem {
    /// Creates a selectable fixed item of the given width.
    pub fn new(width: i32) -> Self {
        Self {
            width,
            selectable: true,
            focus_spans: Vec::new(),
        }
    }

    /// Sets whether the item participates in selection.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets the focusable spans.
    pub fn with_focus_spans(mut self, spans: Vec<FocusSpan>) -> Self {
        self.focus_spans = spans;
        self
    }
}

/// An adapter decorator that prepends headers and appends footers around a
/// wrapped adapter.
///
/// The decorator implements the same [`StripAdapter`] contract as the
/// adapter it wraps, so the engine composes with it transparently: it is
/// assembled explicitly at setup time, never detected at runtime. Fixed
/// positions report [`KindId::FIXED`], keeping their slots out of the
/// recycle pools, and have no stable identity.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use filmstrip::adapter::{FixedItem, HeaderFooterAdapter, StripAdapter, VecAdapter};
///
/// let inner = Arc::new(VecAdapter::with_uniform_width(8, 100));
/// let adapter = HeaderFooterAdapter::new(inner)
///     .with_header(FixedItem::new(40).with_selectable(false))
///     .with_footer(FixedItem::new(40));
///
/// assert_eq!(adapter.count(), 10);
/// assert!(!adapter.is_enabled(0)); // header
/// assert!(adapter.is_enabled(1)); // first wrapped item
/// ```
pub struct HeaderFooterAdapter {
    inner: Arc<dyn StripAdapter>,
    headers: Vec<FixedItem>,
    footers: Vec<FixedItem>,
}

impl HeaderFooterAdapter {
    /// Wraps an adapter with no fixed items yet.
    pub fn new(inner: Arc<dyn StripAdapter>) -> Self {
        Self {
            inner,
            headers: Vec::new(),
            footers: Vec::new(),
        }
    }

    /// Appends a header after any existing headers.
    pub fn with_header(mut self, header: FixedItem) -> Self {
        self.headers.push(header);
        self
    }

    /// Appends a footer after any existing footers.
    pub fn with_footer(mut self, footer: FixedItem) -> Self {
        self.footers.push(footer);
        self
    }

    /// Number of headers.
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of footers.
    pub fn footer_count(&self) -> usize {
        self.footers.len()
    }

    /// The wrapped adapter.
    pub fn inner(&self) -> &Arc<dyn StripAdapter> {
        &self.inner
    }

    /// Classifies a composed position: a fixed item, or a position of the
    /// wrapped adapter.
    fn resolve(&self, position: usize) -> Resolved<'_> {
        if position < self.headers.len() {
            return Resolved::Fixed(&self.headers[position]);
        }
        let adjusted = position - self.headers.len();
        let inner_count = self.inner.count();
        if adjusted < inner_count {
            Resolved::Inner(adjusted)
        } else {
            Resolved::Fixed(&self.footers[adjusted - inner_count])
        }
    }
}

enum Resolved<'a> {
    Fixed(&'a FixedItem),
    Inner(usize),
}

impl StripAdapter for HeaderFooterAdapter {
    fn count(&self) -> usize {
        self.headers.len() + self.inner.count() + self.footers.len()
    }

    fn item_width(&self, position: usize) -> i32 {
        match self.resolve(position) {
            Resolved::Fixed(item) => item.width,
            Resolved::Inner(pos) => self.inner.item_width(pos),
        }
    }

    fn kind_of(&self, position: usize) -> KindId {
        match self.resolve(position) {
            Resolved::Fixed(_) => KindId::FIXED,
            Resolved::Inner(pos) => self.inner.kind_of(pos),
        }
    }

    fn kind_count(&self) -> usize {
        self.inner.kind_count()
    }

    fn is_enabled(&self, position: usize) -> bool {
        match self.resolve(position) {
            Resolved::Fixed(item) => item.selectable,
            Resolved::Inner(pos) => self.inner.is_enabled(pos),
        }
    }

    fn all_enabled(&self) -> bool {
        self.inner.all_enabled()
            && self.headers.iter().all(|h| h.selectable)
            && self.footers.iter().all(|f| f.selectable)
    }

    fn stable_id(&self, position: usize) -> i64 {
        match self.resolve(position) {
            Resolved::Fixed(_) => -1,
            Resolved::Inner(pos) => self.inner.stable_id(pos),
        }
    }

    fn has_stable_ids(&self) -> bool {
        self.inner.has_stable_ids()
    }

    fn focus_spans(&self, position: usize) -> Vec<FocusSpan> {
        match self.resolve(position) {
            Resolved::Fixed(item) => item.focus_spans.clone(),
            Resolved::Inner(pos) => self.inner.focus_spans(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{StripItem, VecAdapter};

    fn wrapped() -> HeaderFooterAdapter {
        let inner = Arc::new(VecAdapter::new(vec![
            StripItem::new(100).with_kind(KindId(1)),
            StripItem::new(120),
        ]));
        HeaderFooterAdapter::new(inner)
            .with_header(FixedItem::new(30).with_selectable(false))
            .with_footer(FixedItem::new(50))
    }

    #[test]
    fn test_counts_compose() {
        let adapter = wrapped();
        assert_eq!(adapter.count(), 4);
        assert_eq!(adapter.header_count(), 1);
        assert_eq!(adapter.footer_count(), 1);
    }

    #[test]
    fn test_fixed_positions_report_fixed_kind() {
        let adapter = wrapped();
        assert_eq!(adapter.kind_of(0), KindId::FIXED);
        assert_eq!(adapter.kind_of(1), KindId(1));
        assert_eq!(adapter.kind_of(2), KindId::DEFAULT);
        assert_eq!(adapter.kind_of(3), KindId::FIXED);
    }

    #[test]
    fn test_selectability_and_widths_delegate_with_offset() {
        let adapter = wrapped();
        assert!(!adapter.is_enabled(0));
        assert!(adapter.is_enabled(1));
        assert!(adapter.is_enabled(3));
        assert!(!adapter.all_enabled());

        assert_eq!(adapter.item_width(0), 30);
        assert_eq!(adapter.item_width(1), 100);
        assert_eq!(adapter.item_width(2), 120);
        assert_eq!(adapter.item_width(3), 50);
    }

    #[test]
    fn test_fixed_items_have_no_stable_identity() {
        let adapter = wrapped();
        assert_eq!(adapter.stable_id(0), -1);
        assert_eq!(adapter.stable_id(1), 0);
        assert_eq!(adapter.stable_id(3), -1);
    }
}
