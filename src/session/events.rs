//! Store event bus — explicit observer registry for session store changes.
//!
//! Consumers (list views, tag pickers) subscribe to refresh without polling.
//! The bus is owned by the manager instance; there is no process-global
//! registry. Callbacks fire synchronously on the mutating thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A change the store has already committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The model was rebuilt from disk.
    SessionsLoaded,
    /// A session was written, with its id.
    SessionSaved(String),
    /// A session was removed, with its id.
    SessionDeleted(String),
}

type ListenerFn = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Subscriber registry. Thread-safe so handles can be registered from setup
/// code, but events are delivered on whichever thread mutates the store.
#[derive(Default)]
pub struct SessionEventBus {
    listeners: RwLock<Vec<(u64, ListenerFn)>>,
    next_listener_id: AtomicU64,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Broadcast an event to every subscriber.
    pub fn emit(&self, event: &StoreEvent) {
        let listeners = self.listeners.read().unwrap();
        for (_, listener) in listeners.iter() {
            listener(event);
        }
    }

    /// Subscribe to store events. Returns a handle for unsubscribing.
    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + Send + Sync + 'static) -> u64 {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.write().unwrap();
        listeners.push((id, Arc::new(listener)));
        id
    }

    /// Unsubscribe a listener by handle. Unknown handles are ignored.
    pub fn unsubscribe(&self, id: u64) {
        let mut listeners = self.listeners.write().unwrap();
        listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().unwrap().len()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    #[test]
    fn emit_reaches_every_subscriber() {
        let bus = SessionEventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let rx = received.clone();
        bus.subscribe(move |evt| {
            rx.lock().unwrap().push(evt.clone());
        });

        bus.emit(&StoreEvent::SessionsLoaded);
        bus.emit(&StoreEvent::SessionSaved("sess-1".into()));

        let events = received.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StoreEvent::SessionsLoaded);
        assert_eq!(events[1], StoreEvent::SessionSaved("sess-1".into()));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = SessionEventBus::new();
        let called = Arc::new(AtomicBool::new(false));

        let c = called.clone();
        let id = bus.subscribe(move |_| {
            c.store(true, Ordering::Relaxed);
        });

        bus.unsubscribe(id);
        bus.emit(&StoreEvent::SessionDeleted("sess-1".into()));

        assert!(!called.load(Ordering::Relaxed));
    }

    #[test]
    fn subscriber_count_tracks() {
        let bus = SessionEventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let id1 = bus.subscribe(|_| {});
        let _id2 = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 2);

        bus.unsubscribe(id1);
        assert_eq!(bus.subscriber_count(), 1);
    }
}
