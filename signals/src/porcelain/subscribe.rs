use crate::broadcast::{IntoBroadcastListener, ListenerGuard};

/// Trait for subscribing to changes - provides the subscribe method
///
/// Implemented by types that own a `Broadcast<T>` of their own changes and want to expose listening
/// without exposing the sending side.
pub trait Subscribe<T: 'static> {
    /// Subscribe to changes with a listener that receives each change
    fn subscribe<L>(&self, listener: L) -> SubscriptionGuard
    where L: IntoBroadcastListener<T>;
}

/// A type-erased guard for a subscription. Dropping it unsubscribes.
#[must_use = "dropping a SubscriptionGuard immediately unsubscribes the listener"]
pub struct SubscriptionGuard {
    _listenerguard: Box<dyn std::any::Any + Send + Sync>,
}

impl SubscriptionGuard {
    pub fn new<T: 'static>(lguard: ListenerGuard<T>) -> Self
    where ListenerGuard<T>: Send + Sync {
        Self { _listenerguard: Box::new(lguard) }
    }
}

impl std::fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("SubscriptionGuard").finish_non_exhaustive() }
}

impl<T: 'static> From<ListenerGuard<T>> for SubscriptionGuard
where ListenerGuard<T>: Send + Sync
{
    fn from(guard: ListenerGuard<T>) -> Self { Self::new(guard) }
}
