//! Thread-affinity verification utilities for Filmstrip.
//!
//! The strip engine mutates its window and recycler in place without any
//! internal locking: every operation must run on the thread that created
//! the engine. This module provides [`ThreadAffinity`], which records the
//! creating thread and turns access from any other thread into a loud,
//! clearly-identified panic instead of silent state corruption.
//!
//! Two levels of checking are provided:
//!
//! - [`ThreadAffinity::debug_assert_same_thread`]: only active in debug
//!   builds. Use liberally on hot paths.
//! - [`ThreadAffinity::assert_same_thread`]: always active. Use for entry
//!   points where a cross-thread call would corrupt state even in release
//!   builds (e.g. adapter change notifications).
//!
//! # Example
//!
//! ```
//! use filmstrip_core::ThreadAffinity;
//!
//! struct Engine {
//!     affinity: ThreadAffinity,
//!     value: std::cell::Cell<i32>,
//! }
//!
//! impl Engine {
//!     fn new() -> Self {
//!         Self {
//!             affinity: ThreadAffinity::current(),
//!             value: std::cell::Cell::new(0),
//!         }
//!     }
//!
//!     fn set_value(&self, v: i32) {
//!         self.affinity.debug_assert_same_thread();
//!         self.value.set(v);
//!     }
//! }
//! ```

use std::thread::ThreadId;

/// Records the thread an object was created on and verifies that
/// subsequent operations occur on the same thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Creates a thread-affinity tracker bound to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Returns `true` if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panics if the current thread does not match this affinity.
    ///
    /// Always active, in both debug and release builds.
    #[inline]
    pub fn assert_same_thread(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only variant of [`assert_same_thread`](Self::assert_same_thread).
    ///
    /// A no-op in release builds.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread("engine accessed from wrong thread");
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "THREAD AFFINITY VIOLATION: {msg}.\n\
             Object was created on thread {:?} but is being accessed from \
             thread \"{current_name}\" ({current_id:?}).\n\
             The strip engine mutates its window and recycler without \
             locking; all layout, scroll and selection operations, and all \
             adapter change notifications, must be performed on the thread \
             that owns the engine.",
            self.thread_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_thread_passes() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread("should not panic");
        affinity.debug_assert_same_thread();
    }

    #[test]
    fn test_other_thread_detected() {
        let affinity = ThreadAffinity::current();
        let handle = std::thread::spawn(move || affinity.is_same_thread());
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn test_other_thread_panics() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || {
            affinity.assert_same_thread("cross-thread access");
        })
        .join();
        assert!(result.is_err(), "expected affinity violation to panic");
    }

    #[test]
    fn test_copy_preserves_affinity() {
        let a = ThreadAffinity::current();
        let b = a;
        assert_eq!(a.thread_id(), b.thread_id());
    }
}
