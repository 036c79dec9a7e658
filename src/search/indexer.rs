use anyhow::{Context, Result};
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument,
    schema::{Field, STORED, Schema, TEXT},
    tokenizer::TextAnalyzer,
};

use crate::catalog::{Actor, ActorCatalog};
use crate::locale::{Translation, translation_key};
use crate::search::config::WRITER_MEMORY_BUDGET;

/// One searchable record per actor, rebuilt on every locale change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub actor: Actor,
    pub actor_name: String,
    pub localized_name: Option<String>,
    pub english_name: Option<String>,
}

/// Join the catalog with the requested and reference translations.
///
/// Every catalog actor yields exactly one entry, in catalog order. Missing
/// translation keys leave the corresponding name empty.
pub fn build_entries(
    catalog: &ActorCatalog,
    translation: &Translation,
    reference: &Translation,
) -> Vec<SearchEntry> {
    catalog
        .iter()
        .map(|(actor, actor_name)| {
            let key = translation_key(actor_name);
            SearchEntry {
                actor,
                actor_name: actor_name.to_string(),
                localized_name: translation.get(&key).cloned(),
                english_name: reference.get(&key).cloned(),
            }
        })
        .collect()
}

/// Break a CamelCase internal name into words: `FireStaff` becomes
/// `Fire Staff`, `HTTPServer` becomes `HTTP Server`.
pub fn split_internal_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexFields {
    pub actor_name: Field,
    pub localized_name: Field,
    pub english_name: Field,
    /// Position of the entry in catalog order
    pub ord: Field,
}

impl IndexFields {
    pub fn searchable(&self) -> [Field; 3] {
        [self.actor_name, self.localized_name, self.english_name]
    }
}

/// In-RAM tantivy index over a full set of search entries
pub struct ActorIndex {
    index: Index,
    reader: IndexReader,
    fields: IndexFields,
    actors: Vec<Actor>,
}

impl ActorIndex {
    /// Index every entry. The index is immutable once built.
    pub fn build(entries: &[SearchEntry]) -> Result<Self> {
        let mut schema_builder = Schema::builder();

        let fields = IndexFields {
            actor_name: schema_builder.add_text_field("actor_name", TEXT),
            localized_name: schema_builder.add_text_field("localized_name", TEXT),
            english_name: schema_builder.add_text_field("english_name", TEXT),
            ord: schema_builder.add_u64_field("ord", STORED),
        };

        let index = Index::create_in_ram(schema_builder.build());

        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BUDGET)
            .context("Failed to create index writer")?;

        for (ord, entry) in entries.iter().enumerate() {
            let mut doc = TantivyDocument::default();
            doc.add_u64(fields.ord, ord as u64);
            doc.add_text(fields.actor_name, entry.actor_name.as_str());
            let words = split_internal_name(&entry.actor_name);
            if words != entry.actor_name {
                doc.add_text(fields.actor_name, words);
            }
            if let Some(name) = &entry.localized_name {
                doc.add_text(fields.localized_name, name.as_str());
            }
            if let Some(name) = &entry.english_name {
                doc.add_text(fields.english_name, name.as_str());
            }
            writer.add_document(doc)?;
        }

        writer.commit().context("Failed to commit search index")?;
        writer.wait_merging_threads()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .context("Failed to open search index reader")?;

        Ok(Self {
            index,
            reader,
            fields,
            actors: entries.iter().map(|entry| entry.actor).collect(),
        })
    }

    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Analyzer shared by all name fields, used to tokenize queries
    pub fn query_analyzer(&self) -> Result<TextAnalyzer> {
        Ok(self.index.tokenizer_for_field(self.fields.actor_name)?)
    }

    pub(crate) fn fields(&self) -> IndexFields {
        self.fields
    }

    /// Actor stored at a catalog position
    pub fn actor_at(&self, ord: u64) -> Option<Actor> {
        usize::try_from(ord)
            .ok()
            .and_then(|ord| self.actors.get(ord).copied())
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ActorCatalog {
        ActorCatalog::new([(Actor(1), "Sword"), (Actor(2), "Shield")]).unwrap()
    }

    #[test]
    fn test_build_entries_covers_catalog() {
        let translation = Translation::from([("actor.Sword".to_string(), "Épée".to_string())]);
        let reference = Translation::from([
            ("actor.Sword".to_string(), "Sword".to_string()),
            ("actor.Shield".to_string(), "Shield".to_string()),
        ]);

        let entries = build_entries(&catalog(), &translation, &reference);

        assert_eq!(
            entries,
            vec![
                SearchEntry {
                    actor: Actor(1),
                    actor_name: "Sword".to_string(),
                    localized_name: Some("Épée".to_string()),
                    english_name: Some("Sword".to_string()),
                },
                SearchEntry {
                    actor: Actor(2),
                    actor_name: "Shield".to_string(),
                    localized_name: None,
                    english_name: Some("Shield".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_split_internal_name() {
        assert_eq!(split_internal_name("FireStaff"), "Fire Staff");
        assert_eq!(split_internal_name("HTTPServer"), "HTTP Server");
        assert_eq!(split_internal_name("Potion2Large"), "Potion2 Large");
        assert_eq!(split_internal_name("Sword"), "Sword");
        assert_eq!(split_internal_name("iron_helmet"), "iron_helmet");
    }

    #[test]
    fn test_index_holds_every_entry() {
        let entries = build_entries(&catalog(), &Translation::new(), &Translation::new());
        let index = ActorIndex::build(&entries).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.searcher().num_docs(), 2);
        assert_eq!(index.actor_at(1), Some(Actor(2)));
        assert_eq!(index.actor_at(2), None);
    }

    #[test]
    fn test_empty_index() {
        let index = ActorIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.searcher().num_docs(), 0);
    }
}
