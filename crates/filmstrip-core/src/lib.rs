//! Core systems for Filmstrip: signals and thread-affinity checks.
//!
//! This crate carries the infrastructure the strip engine is built on,
//! kept separate from the engine itself so adapters and hosts can depend
//! on the notification types without pulling in layout code.
//!
//! - [`Signal`] - type-safe signal/slot notifications
//! - [`ThreadAffinity`] - single-thread ownership enforcement

pub mod signal;
pub mod thread_check;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
