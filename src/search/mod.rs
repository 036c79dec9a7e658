//! # Search Module
//!
//! Localized fuzzy search over the actor catalog, backed by an in-RAM
//! tantivy index rebuilt wholesale for every locale.
//!
//! ## Key Components
//!
//! - [`indexer`] - Joins catalog and translations into search entries and indexes them
//! - [`fuzzy`] - Search functions: the unfiltered default and the localized fuzzy search
//! - [`config`] - Configuration constants and tunables

pub mod config;
pub mod fuzzy;
pub mod indexer;

pub use config::SearchConfig;
pub use fuzzy::{FuzzySearchOptions, ItemSearch, ItemSearchFn, LocalizedSearch, UnfilteredSearch};
pub use indexer::{ActorIndex, SearchEntry, build_entries};
