//! Subscriber registry
//!
//! Ordered list of callbacks invoked with every newly published search
//! function. Removal is by callback identity, so the same closure can only
//! be removed through the [`Subscription`] that added it (or another one
//! holding the same `Arc`). A [`Subscription`] only keeps a weak reference,
//! so whatever the callback owns is released once the registry lets go.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::search::ItemSearchFn;

/// Callback receiving each newly active search function
pub type Subscriber = Arc<dyn Fn(&ItemSearchFn) + Send + Sync>;

type SubscriberList = Mutex<Vec<Subscriber>>;

fn lock(list: &SubscriberList) -> MutexGuard<'_, Vec<Subscriber>> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    subscribers: Arc<SubscriberList>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber; notification order is subscription order
    pub fn subscribe(&self, subscriber: Subscriber) -> Subscription {
        let handle = Arc::downgrade(&subscriber);
        lock(&self.subscribers).push(subscriber);
        Subscription {
            subscribers: Arc::downgrade(&self.subscribers),
            subscriber: handle,
            active: AtomicBool::new(true),
        }
    }

    /// Invoke every subscriber with `search`, in order.
    ///
    /// The list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self, search: &ItemSearchFn) {
        let snapshot: Vec<Subscriber> = lock(&self.subscribers).clone();
        tracing::debug!("Notifying {} search subscribers", snapshot.len());
        for subscriber in snapshot {
            subscriber(search);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.subscribers).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.subscribers).is_empty()
    }
}

/// Handle returned by [`SubscriberRegistry::subscribe`]
#[must_use = "dropping a Subscription keeps the callback registered; call unsubscribe to remove it"]
pub struct Subscription {
    subscribers: Weak<SubscriberList>,
    subscriber: Weak<dyn Fn(&ItemSearchFn) + Send + Sync>,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the first registered occurrence of this callback.
    ///
    /// Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        let mut subscribers = lock(&subscribers);
        if let Some(index) = subscribers
            .iter()
            .position(|registered| Weak::ptr_eq(&Arc::downgrade(registered), &self.subscriber))
        {
            subscribers.remove(index);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Actor, ActorCatalog};
    use crate::search::UnfilteredSearch;
    use std::sync::atomic::AtomicUsize;

    fn search_fn() -> ItemSearchFn {
        let catalog = ActorCatalog::new([(Actor(1), "Sword")]).unwrap();
        Arc::new(UnfilteredSearch::new(&catalog))
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Subscriber {
        let log = log.clone();
        Arc::new(move |_: &ItemSearchFn| log.lock().unwrap().push(name))
    }

    #[test]
    fn test_notify_in_subscription_order() {
        let registry = SubscriberRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _a = registry.subscribe(recorder(&log, "a"));
        let _b = registry.subscribe(recorder(&log, "b"));
        let _c = registry.subscribe(recorder(&log, "c"));

        registry.notify(&search_fn());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let subscription = registry.subscribe(Arc::new(move |_: &ItemSearchFn| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(registry.len(), 1);

        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(registry.is_empty());
        assert!(!subscription.is_active());

        registry.notify(&search_fn());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_removes_first_matching_instance() {
        let registry = SubscriberRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = recorder(&log, "shared");

        let first = registry.subscribe(shared.clone());
        let _other = registry.subscribe(recorder(&log, "other"));
        let _second = registry.subscribe(shared);

        first.unsubscribe();
        registry.notify(&search_fn());

        assert_eq!(registry.len(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["other", "shared"]);
    }

    #[test]
    fn test_subscriber_may_unsubscribe_itself() {
        let registry = SubscriberRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner = slot.clone();

        let subscription = registry.subscribe(Arc::new(move |_: &ItemSearchFn| {
            if let Some(subscription) = inner.lock().unwrap().as_ref() {
                subscription.unsubscribe();
            }
        }));
        *slot.lock().unwrap() = Some(subscription);

        registry.notify(&search_fn());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscription_does_not_keep_callback_alive() {
        let registry = SubscriberRegistry::new();
        let owned = Arc::new(());
        let captured = owned.clone();
        let _subscription = registry.subscribe(Arc::new(move |_: &ItemSearchFn| {
            let _ = Arc::strong_count(&captured);
        }));
        assert_eq!(Arc::strong_count(&owned), 2);

        drop(registry);
        assert_eq!(Arc::strong_count(&owned), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe(Arc::new(|_: &ItemSearchFn| {}));
        drop(registry);

        subscription.unsubscribe();
    }
}
