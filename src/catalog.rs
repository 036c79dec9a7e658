//! Actor catalog
//!
//! The fixed set of searchable game entities and their canonical internal
//! names. The catalog is loaded once and never changes afterwards; every
//! search index built from it covers exactly these actors, in this order.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a game entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(pub u32);

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogEntry {
    id: Actor,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "actor")]
    actors: Vec<CatalogEntry>,
}

/// Ordered, read-only mapping from actor to internal name
#[derive(Debug, Clone, Default)]
pub struct ActorCatalog {
    entries: Vec<CatalogEntry>,
}

impl ActorCatalog {
    /// Build a catalog from `(actor, internal name)` pairs, preserving order
    pub fn new<I, S>(actors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Actor, S)>,
        S: Into<String>,
    {
        let entries: Vec<CatalogEntry> = actors
            .into_iter()
            .map(|(id, name)| CatalogEntry {
                id,
                name: name.into(),
            })
            .collect();

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.name.is_empty() {
                bail!("Actor {} has an empty name", entry.id);
            }
            if !seen.insert(entry.id) {
                bail!("Duplicate actor id {} in catalog", entry.id);
            }
        }

        Ok(Self { entries })
    }

    /// Parse a catalog from TOML text made of `[[actor]]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).context("Failed to parse actor catalog")?;
        Self::new(file.actors.into_iter().map(|entry| (entry.id, entry.name)))
    }

    /// Load a catalog from a TOML file on disk
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read actor catalog: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid actor catalog: {}", path.display()))
    }

    /// All actors, in catalog order
    pub fn actors(&self) -> Vec<Actor> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Canonical internal name of an actor
    pub fn name(&self, actor: Actor) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == actor)
            .map(|entry| entry.name.as_str())
    }

    /// Iterate `(actor, internal name)` in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Actor, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.id, entry.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
