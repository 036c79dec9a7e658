//! # Locale Module
//!
//! Translation tables and the loaders that fetch them.
//!
//! A translation table is a flat mapping from translation key to localized
//! string for a single locale. Actor display names live under the
//! `actor.<internal name>` keys.
//!
//! ## Key Components
//!
//! - [`LocaleLoader`] - Async source of translation tables
//! - [`loader`] - Directory, HTTP and in-memory loaders

use std::collections::HashMap;
use std::future::Future;

use anyhow::{Result, bail};
use serde_json::Value;

use crate::search::config::ACTOR_KEY_PREFIX;

pub mod loader;

pub use loader::{DirLocaleLoader, HttpLocaleLoader, MemoryLocaleLoader};

/// Translation key to localized string, for one locale
pub type Translation = HashMap<String, String>;

/// Asynchronous source of translation tables
pub trait LocaleLoader: Send + Sync + 'static {
    /// Load the full translation table for `locale`
    fn load_locale(&self, locale: &str) -> impl Future<Output = Result<Translation>> + Send;
}

/// Translation key holding the display name of an actor
pub fn translation_key(actor_name: &str) -> String {
    format!("{ACTOR_KEY_PREFIX}{actor_name}")
}

/// Reject locale codes that could escape a directory or URL path
pub fn validate_locale(locale: &str) -> Result<()> {
    if locale.is_empty() {
        bail!("Locale code must not be empty");
    }
    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("Invalid locale code: {locale}");
    }
    Ok(())
}

/// Flatten a JSON translation bundle into dotted keys.
///
/// Nested objects contribute `parent.child` keys; non-string leaves are
/// ignored.
pub fn flatten_translation(value: &Value) -> Translation {
    let mut out = Translation::new();
    flatten_into(&mut out, String::new(), value);
    out
}

fn flatten_into(out: &mut Translation, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(out, path, child);
            }
        }
        Value::String(text) if !prefix.is_empty() => {
            out.insert(prefix, text.clone());
        }
        _ => {}
    }
}
