//! Filmstrip - a headless, virtualized, horizontally-scrollable strip view.
//!
//! Filmstrip renders an unbounded, adapter-supplied item collection into a
//! bounded window of reusable slots. It tracks selection and focus across
//! scroll and key-navigation events and recomputes incremental layout
//! deltas instead of re-laying-out the whole collection on every change.
//!
//! The engine is *headless*: it owns positions, pixel spans, selection and
//! focus, and leaves drawing, text layout and input decoding to the host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │   Adapter    │────>│   StripView   │────>│   Signals    │
//! │ (StripAdapter)│    │ layout/scroll │     │ to the host  │
//! └──────────────┘     └───────┬───────┘     └──────────────┘
//!                              │
//!                      ┌───────┴───────┐
//!                      │   Recycler    │
//!                      │ (slot pools)  │
//!                      └───────────────┘
//! ```
//!
//! - [`adapter`] - the capability contract the engine consumes: collection
//!   size, per-position kind, enabled state, stable identity, measurement.
//! - [`strip`] - the engine itself: window state, recycler, layout intents,
//!   selection state machine, scroll/navigation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use filmstrip::adapter::VecAdapter;
//! use filmstrip::strip::{Direction, StripView};
//!
//! // Ten items, 100px wide each, in a 400px viewport.
//! let adapter = Arc::new(VecAdapter::with_uniform_width(10, 100));
//! let mut strip = StripView::new(400);
//! strip.set_adapter(Some(adapter));
//!
//! assert_eq!(strip.selected_position(), 0);
//! strip.page_scroll(Direction::Right);
//! assert_eq!(strip.selected_position(), 3);
//! ```

pub mod adapter;
pub mod strip;

pub use adapter::{FocusSpan, KindId, StripAdapter};
pub use strip::{Direction, Slot, StripView, NO_POSITION};
