//! Ordered, synchronous change channels.
//!
//! A [`Broadcast`] delivers each value to its listeners on the sending thread, oldest subscription
//! first. Listeners are held in a slot table keyed by a sequence number; a [`ListenerGuard`] owns one
//! slot and frees it on drop.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::trace;

type Listener<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Slots<T> {
    next: u64,
    listeners: BTreeMap<u64, Listener<T>>,
}

/// The sending side of a change channel. Clones deliver to the same listeners.
pub struct Broadcast<T>(Arc<Mutex<Slots<T>>>);

/// Listen-only access to a [`Broadcast`]
pub struct Ref<'a, T>(&'a Broadcast<T>);

/// Keeps one listener subscribed. Dropping it unsubscribes; it never keeps the channel alive.
#[must_use = "the listener is removed as soon as its guard is dropped"]
pub struct ListenerGuard<T> {
    slots: Weak<Mutex<Slots<T>>>,
    slot: u64,
}

/// Anything that can receive the values of a `Broadcast<T>`
pub trait IntoBroadcastListener<T> {
    fn into_listener(self) -> Arc<dyn Fn(T) + Send + Sync>;
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Broadcast<T> {
    pub fn new() -> Self { Self(Arc::new(Mutex::new(Slots { next: 0, listeners: BTreeMap::new() }))) }

    pub fn reference(&self) -> Ref<'_, T> { Ref(self) }

    pub fn listener_count(&self) -> usize { self.0.lock().unwrap().listeners.len() }

    /// Deliver `value` to every listener subscribed when the send starts.
    ///
    /// The slot table is not locked while listeners run, so a listener may subscribe, drop a guard or
    /// send again.
    pub fn send(&self, value: T)
    where T: Clone {
        let listeners: Vec<Listener<T>> = self.0.lock().unwrap().listeners.values().cloned().collect();
        trace!("delivering change to {} listeners", listeners.len());
        let Some((last, rest)) = listeners.split_last() else {
            return;
        };
        for listener in rest {
            listener(value.clone());
        }
        last(value);
    }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast").field("listeners", &self.listener_count()).finish()
    }
}

impl<T> Ref<'_, T> {
    pub fn listen<L>(&self, listener: L) -> ListenerGuard<T>
    where L: IntoBroadcastListener<T> {
        let mut slots = self.0.0.lock().unwrap();
        let slot = slots.next;
        slots.next += 1;
        slots.listeners.insert(slot, listener.into_listener());
        ListenerGuard { slots: Arc::downgrade(&self.0.0), slot }
    }
}

impl<T> ListenerGuard<T> {
    /// Whether the channel this guard listens to still exists
    pub fn is_connected(&self) -> bool { self.slots.strong_count() > 0 }
}

impl<T> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.lock().unwrap().listeners.remove(&self.slot);
        }
    }
}

impl<T> std::fmt::Debug for ListenerGuard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("slot", &self.slot).field("connected", &self.is_connected()).finish()
    }
}

impl<T, F> IntoBroadcastListener<T> for F
where F: Fn(T) + Send + Sync + 'static
{
    fn into_listener(self) -> Arc<dyn Fn(T) + Send + Sync> { Arc::new(self) }
}

// Closed receivers are skipped; the guard decides when delivery stops
#[cfg(feature = "tokio")]
impl<T> IntoBroadcastListener<T> for tokio::sync::mpsc::UnboundedSender<T>
where T: Send + 'static
{
    fn into_listener(self) -> Arc<dyn Fn(T) + Send + Sync> {
        Arc::new(move |value| {
            let _ = self.send(value);
        })
    }
}
