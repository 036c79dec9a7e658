use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anyhow::{Context, Result, bail};

use crate::binding::SearchBinding;
use crate::catalog::ActorCatalog;
use crate::locale::{LocaleLoader, Translation};
use crate::registry::{Subscriber, SubscriberRegistry, Subscription};
use crate::search::{
    ActorIndex, ItemSearchFn, LocalizedSearch, SearchConfig, UnfilteredSearch, build_entries,
};

/// Result of a call to [`ActorSearchService::initialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The locale was already current; nothing was rebuilt or published
    Skipped,
    /// A new search function was built and published
    Built { locale: String, entries: usize },
}

/// Owns the current locale, the active search function and its subscribers.
///
/// One instance per application session, shared through an `Arc` and passed
/// to every consumer explicitly.
pub struct ActorSearchService<L> {
    catalog: Arc<ActorCatalog>,
    loader: L,
    config: SearchConfig,
    current_locale: Mutex<String>,
    active: RwLock<ItemSearchFn>,
    /// Held across the write of `active` and the notification that follows
    publish_lock: Mutex<()>,
    registry: SubscriberRegistry,
}

impl<L: LocaleLoader> ActorSearchService<L> {
    pub fn new(catalog: ActorCatalog, loader: L) -> Self {
        let active: ItemSearchFn = Arc::new(UnfilteredSearch::new(&catalog));
        Self {
            catalog: Arc::new(catalog),
            loader,
            config: SearchConfig::default(),
            current_locale: Mutex::new(String::new()),
            active: RwLock::new(active),
            publish_lock: Mutex::new(()),
            registry: SubscriberRegistry::new(),
        }
    }

    pub fn with_config(catalog: ActorCatalog, loader: L, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(catalog, loader)
        })
    }

    /// Build and publish the search function for `locale`.
    ///
    /// Returns [`InitOutcome::Skipped`] without touching anything when
    /// `locale` is already current. The locale is marked current before the
    /// reference translation is loaded, so a concurrent call for the same
    /// locale is skipped too. A failed load leaves the marker set unless
    /// `retry_failed_locale` is enabled.
    pub async fn initialize(&self, locale: &str, translation: &Translation) -> Result<InitOutcome> {
        if locale.is_empty() {
            bail!("Locale code must not be empty");
        }

        {
            let mut current = self
                .current_locale
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == locale {
                tracing::debug!("Locale {} already current, skipping rebuild", locale);
                return Ok(InitOutcome::Skipped);
            }
            *current = locale.to_string();
        }

        tracing::info!("Initializing localized item search for locale {}", locale);

        let search = match self.build(locale, translation).await {
            Ok(search) => search,
            Err(e) => {
                tracing::warn!("Failed to build item search for locale {}: {:#}", locale, e);
                if self.config.retry_failed_locale {
                    self.reset_locale_if(locale);
                }
                return Err(e);
            }
        };

        self.publish(search);
        tracing::info!("Localized item search initialized for locale {}", locale);

        Ok(InitOutcome::Built {
            locale: locale.to_string(),
            entries: self.catalog.len(),
        })
    }

    async fn build(&self, locale: &str, translation: &Translation) -> Result<ItemSearchFn> {
        let reference_locale = &self.config.reference_locale;
        let reference = self
            .loader
            .load_locale(reference_locale)
            .await
            .with_context(|| format!("Failed to load reference locale {reference_locale}"))?;

        let entries = build_entries(&self.catalog, translation, &reference);
        let index = ActorIndex::build(&entries)
            .with_context(|| format!("Failed to index actors for locale {locale}"))?;

        Ok(Arc::new(LocalizedSearch::new(
            locale,
            index,
            (&self.config).into(),
        )))
    }

    /// Replace the active function, then notify subscribers in order.
    ///
    /// Publications are serialized, so the last function every subscriber
    /// sees is the one left active. Subscribers may call `current()` but
    /// must not publish.
    fn publish(&self, search: ItemSearchFn) {
        let _publishing = self
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = search.clone();
        self.registry.notify(&search);
    }

    /// The currently active search function
    pub fn current(&self) -> ItemSearchFn {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Locale most recently marked current, if any
    pub fn current_locale(&self) -> Option<String> {
        let current = self
            .current_locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (!current.is_empty()).then(|| current.clone())
    }

    /// Forget the current locale so the next `initialize` always rebuilds.
    ///
    /// The active search function is left in place.
    pub fn reset_locale(&self) {
        self.current_locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn reset_locale_if(&self, locale: &str) {
        let mut current = self
            .current_locale
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *current == locale {
            current.clear();
        }
    }

    pub fn subscribe(&self, subscriber: Subscriber) -> Subscription {
        self.registry.subscribe(subscriber)
    }

    /// Bind a consumer to the active search function for its lifetime
    pub fn bind(&self) -> SearchBinding {
        SearchBinding::new(&self.registry, || self.current())
    }

    pub fn catalog(&self) -> &ActorCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}
