//! # Search Configuration Module
//!
//! Provides configuration constants and the tunable [`SearchConfig`] for
//! localized actor search.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Locale whose names are always indexed alongside the requested one
pub const REFERENCE_LOCALE: &str = "en-US";

/// Prefix of actor display name keys in translation tables
pub const ACTOR_KEY_PREFIX: &str = "actor.";

/// Memory budget for the in-RAM index writer (tantivy's minimum, 15MB)
pub const WRITER_MEMORY_BUDGET: usize = 15_000_000;

/// Default edit distance for typo tolerance
pub const DEFAULT_FUZZY_DISTANCE: u8 = 1;

/// Maximum fuzzy distance allowed
pub const MAX_FUZZY_DISTANCE: u8 = 2;

/// Query terms shorter than this only match by prefix
pub const DEFAULT_MIN_FUZZY_TERM_LEN: usize = 3;

/// Score multiplier for exact term matches
pub const DEFAULT_EXACT_BOOST: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Locale fetched as the English reference for every build
    pub reference_locale: String,
    /// Edit distance for fuzzy prefix matching (0-2)
    pub fuzzy_distance: u8,
    /// Minimum term length before typos are tolerated
    pub min_fuzzy_term_len: usize,
    /// Boost applied to exact term matches
    pub exact_boost: f32,
    /// Clear the current-locale marker when a build fails
    pub retry_failed_locale: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            reference_locale: REFERENCE_LOCALE.to_string(),
            fuzzy_distance: DEFAULT_FUZZY_DISTANCE,
            min_fuzzy_term_len: DEFAULT_MIN_FUZZY_TERM_LEN,
            exact_boost: DEFAULT_EXACT_BOOST,
            retry_failed_locale: false,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a TOML config
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse search config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search config: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference_locale.is_empty() {
            bail!("reference_locale must not be empty");
        }
        if self.fuzzy_distance > MAX_FUZZY_DISTANCE {
            bail!(
                "fuzzy_distance {} exceeds maximum of {}",
                self.fuzzy_distance,
                MAX_FUZZY_DISTANCE
            );
        }
        if !(self.exact_boost.is_finite() && self.exact_boost > 0.0) {
            bail!("exact_boost must be a positive number");
        }
        Ok(())
    }
}
