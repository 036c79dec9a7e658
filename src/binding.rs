//! Consumer-side binding to the active search function.
//!
//! A [`SearchBinding`] starts with whatever function is active when it is
//! created, then observes every function published afterwards, in order,
//! until it is dropped.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::Actor;
use crate::registry::{SubscriberRegistry, Subscription};
use crate::search::ItemSearchFn;

pub struct SearchBinding {
    current: ItemSearchFn,
    updates: mpsc::UnboundedReceiver<ItemSearchFn>,
    subscription: Subscription,
}

impl SearchBinding {
    /// Subscribe first, then read the active function, so nothing published
    /// in between is lost.
    pub(crate) fn new(
        registry: &SubscriberRegistry,
        read_current: impl FnOnce() -> ItemSearchFn,
    ) -> Self {
        let (tx, updates) = mpsc::unbounded_channel();
        let subscription = registry.subscribe(Arc::new(move |search: &ItemSearchFn| {
            // receiver gone means the binding is being dropped
            let _ = tx.send(search.clone());
        }));

        Self {
            current: read_current(),
            updates,
            subscription,
        }
    }

    /// Function the consumer should render with right now
    pub fn current(&self) -> &ItemSearchFn {
        &self.current
    }

    /// Search with the current function
    pub fn search(&self, text: &str) -> Option<Vec<Actor>> {
        self.current.search(text)
    }

    /// Wait for the next published function and make it current.
    ///
    /// Returns `None` once the owning service has been dropped.
    pub async fn changed(&mut self) -> Option<ItemSearchFn> {
        let search = self.updates.recv().await?;
        self.current = search.clone();
        Some(search)
    }

    /// Non-blocking variant of [`changed`](Self::changed)
    pub fn try_changed(&mut self) -> Option<ItemSearchFn> {
        let search = self.updates.try_recv().ok()?;
        self.current = search.clone();
        Some(search)
    }
}

impl Drop for SearchBinding {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActorCatalog;
    use crate::search::UnfilteredSearch;

    fn search_fn(actors: &[(u32, &str)]) -> ItemSearchFn {
        let catalog =
            ActorCatalog::new(actors.iter().map(|(id, name)| (Actor(*id), *name))).unwrap();
        Arc::new(UnfilteredSearch::new(&catalog))
    }

    #[test]
    fn test_binding_observes_every_publication() {
        let registry = SubscriberRegistry::new();
        let mut binding = SearchBinding::new(&registry, || search_fn(&[(1, "Sword")]));
        assert_eq!(binding.search("x"), Some(vec![Actor(1)]));
        assert!(binding.try_changed().is_none());

        registry.notify(&search_fn(&[(2, "Shield")]));
        registry.notify(&search_fn(&[(3, "Bow")]));

        assert!(binding.try_changed().is_some());
        assert_eq!(binding.search("x"), Some(vec![Actor(2)]));
        assert!(binding.try_changed().is_some());
        assert_eq!(binding.search("x"), Some(vec![Actor(3)]));
        assert!(binding.try_changed().is_none());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = SubscriberRegistry::new();
        let binding = SearchBinding::new(&registry, || search_fn(&[(1, "Sword")]));
        assert_eq!(registry.len(), 1);

        drop(binding);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_changed_ends_when_registry_dropped() {
        let registry = SubscriberRegistry::new();
        let mut binding = SearchBinding::new(&registry, || search_fn(&[(1, "Sword")]));

        registry.notify(&search_fn(&[(2, "Shield")]));
        drop(registry);

        assert!(binding.changed().await.is_some());
        assert!(binding.changed().await.is_none());
    }
}
