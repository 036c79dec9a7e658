pub mod binding;
pub mod catalog;
pub mod locale;
pub mod registry;
pub mod search;
pub mod service;

pub use binding::SearchBinding;
pub use catalog::{Actor, ActorCatalog};
pub use locale::{LocaleLoader, Translation};
pub use registry::{Subscriber, SubscriberRegistry, Subscription};
pub use search::{ItemSearch, ItemSearchFn, SearchConfig};
pub use service::{ActorSearchService, InitOutcome};
