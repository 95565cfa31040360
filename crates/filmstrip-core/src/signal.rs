//! Signal/slot system for Filmstrip.
//!
//! This module provides a type-safe signal/slot mechanism for notifying
//! collaborators about engine state changes. Signals are emitted by the
//! engine when its state changes, and connected slots (callbacks) are
//! invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Invocation Model
//!
//! Slots are invoked directly, in connection order, on the emitting thread.
//! The engine that owns these signals is single-threaded by contract (see
//! [`crate::thread_check`]), so there is no queued or cross-thread delivery;
//! a slot runs before `emit` returns.
//!
//! Slots may connect or disconnect other slots while a signal is being
//! emitted: `emit` snapshots the connected slots before invoking any of
//! them, so mutations take effect from the next emission.
//!
//! # Example
//!
//! ```
//! use filmstrip_core::Signal;
//!
//! let selection_changed = Signal::<i32>::new();
//!
//! let conn_id = selection_changed.connect(|position| {
//!     println!("selection moved to {position}");
//! });
//!
//! selection_changed.emit(4);
//! selection_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When the signal is emitted, every connected slot is invoked with a
/// reference to the emitted arguments, in the order the slots were
/// connected.
///
/// Multi-argument signals use a tuple as `Args`:
///
/// ```
/// use filmstrip_core::Signal;
///
/// let visible_range_changed = Signal::<(i32, i32)>::new();
/// visible_range_changed.connect(|(first, last)| {
///     println!("visible: {first}..={last}");
/// });
/// visible_range_changed.emit((0, 7));
/// ```
pub struct Signal<Args> {
    connections: Arc<Mutex<SlotMap<ConnectionId, Connection<Args>>>>,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .finish()
    }
}

impl<Args> Signal<Args> {
    /// Creates a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Connects a slot to this signal.
    ///
    /// The slot is invoked with a reference to the arguments each time the
    /// signal is emitted. Returns a [`ConnectionId`] that can be passed to
    /// [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        })
    }

    /// Connects a slot and returns an RAII guard that disconnects it when
    /// dropped.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::clone(&self.connections),
            id,
        }
    }

    /// Disconnects a previously connected slot.
    ///
    /// Returns `true` if the connection existed and was removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnects all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Returns the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emits the signal, invoking every connected slot with `args`.
    ///
    /// The connection list is snapshotted before any slot runs, so slots
    /// may freely connect or disconnect during emission.
    pub fn emit(&self, args: Args) {
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.connections.lock();
            connections.values().map(|c| Arc::clone(&c.slot)).collect()
        };
        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> Clone for Signal<Args> {
    /// Clones share the same connection list: emitting through either clone
    /// invokes the same slots.
    fn clone(&self) -> Self {
        Self {
            connections: Arc::clone(&self.connections),
        }
    }
}

/// RAII guard for a signal connection.
///
/// The connection is removed when the guard is dropped. Obtain one via
/// [`Signal::connect_guarded`].
pub struct ConnectionGuard<Args> {
    connections: Arc<Mutex<SlotMap<ConnectionId, Connection<Args>>>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Drops the guard without disconnecting, leaving the connection alive.
    pub fn forget(self) {
        std::mem::forget(self);
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        self.connections.lock().remove(self.id);
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_emit_invokes_connected_slot() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(AtomicI32::new(0));

        let recv = received.clone();
        signal.connect(move |value| {
            recv.store(*value, Ordering::SeqCst);
        });

        signal.emit(42);
        assert_eq!(received.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_emit_order_matches_connection_order() {
        let signal = Signal::<()>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = log.clone();
            signal.connect(move |_| log.lock().push(tag));
        }

        signal.emit(());
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_disconnect_stops_invocation() {
        let signal = Signal::<()>::new();
        let counter = Arc::new(AtomicI32::new(0));

        let c = counter.clone();
        let id = signal.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(());
        assert!(signal.disconnect(id));
        signal.emit(());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!signal.disconnect(id), "second disconnect is a no-op");
    }

    #[test]
    fn test_connection_guard_disconnects_on_drop() {
        let signal = Signal::<()>::new();
        let counter = Arc::new(AtomicI32::new(0));

        {
            let c = counter.clone();
            let _guard = signal.connect_guarded(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(signal.connection_count(), 1);
            signal.emit(());
        }

        assert_eq!(signal.connection_count(), 0);
        signal.emit(());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slot_may_disconnect_during_emit() {
        let signal = Signal::<()>::new();
        let counter = Arc::new(AtomicI32::new(0));

        let sig = signal.clone();
        let c = counter.clone();
        let id = Arc::new(Mutex::new(None));
        let id_slot = id.clone();
        let connection = signal.connect(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(own) = *id_slot.lock() {
                sig.disconnect(own);
            }
        });
        *id.lock() = Some(connection);

        signal.emit(());
        signal.emit(());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_shares_connections() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(AtomicI32::new(0));

        let recv = received.clone();
        signal.connect(move |value| {
            recv.store(*value, Ordering::SeqCst);
        });

        signal.clone().emit(7);
        assert_eq!(received.load(Ordering::SeqCst), 7);
    }
}
