use std::sync::Arc;

use anyhow::Result;
use tantivy::{
    DocAddress, Score, TantivyDocument, Term,
    collector::TopDocs,
    query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery},
    schema::{IndexRecordOption, Value},
    tokenizer::TokenStream,
};

use crate::catalog::{Actor, ActorCatalog};
use crate::search::config::SearchConfig;
use crate::search::indexer::{ActorIndex, IndexFields};

/// A search function over the actor catalog.
///
/// `None` means "no filtering": the caller shows its default list.
pub trait ItemSearch: Send + Sync {
    fn search(&self, text: &str) -> Option<Vec<Actor>>;

    /// Locale this function was built for, if any
    fn locale(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to the active search function
pub type ItemSearchFn = Arc<dyn ItemSearch>;

/// Search function in effect before any locale has been initialized.
///
/// Always returns the full catalog, whatever the input.
#[derive(Debug, Clone)]
pub struct UnfilteredSearch {
    actors: Vec<Actor>,
}

impl UnfilteredSearch {
    pub fn new(catalog: &ActorCatalog) -> Self {
        Self {
            actors: catalog.actors(),
        }
    }
}

impl ItemSearch for UnfilteredSearch {
    fn search(&self, _text: &str) -> Option<Vec<Actor>> {
        Some(self.actors.clone())
    }
}

/// Tuning applied when turning text into a tantivy query
#[derive(Debug, Clone, Copy)]
pub struct FuzzySearchOptions {
    pub fuzzy_distance: u8,
    pub min_fuzzy_term_len: usize,
    pub exact_boost: Score,
}

impl From<&SearchConfig> for FuzzySearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            fuzzy_distance: config.fuzzy_distance,
            min_fuzzy_term_len: config.min_fuzzy_term_len,
            exact_boost: config.exact_boost,
        }
    }
}

impl Default for FuzzySearchOptions {
    fn default() -> Self {
        (&SearchConfig::default()).into()
    }
}

/// Fuzzy search over one locale's index
pub struct LocalizedSearch {
    locale: String,
    index: ActorIndex,
    options: FuzzySearchOptions,
}

impl LocalizedSearch {
    pub fn new(locale: impl Into<String>, index: ActorIndex, options: FuzzySearchOptions) -> Self {
        Self {
            locale: locale.into(),
            index,
            options,
        }
    }

    /// Run a query, returning matched actors by descending relevance
    pub fn try_search(&self, text: &str) -> Result<Option<Vec<Actor>>> {
        if text.is_empty() {
            return Ok(None);
        }

        let terms = self.tokenize(text)?;
        if terms.is_empty() || self.index.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let query = self.build_query(&terms);
        let searcher = self.index.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.index.len()))?;

        let mut ranked = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            if let Some(ord) = self.doc_ord(&searcher, doc_address)? {
                ranked.push((score, ord));
            }
        }
        ranked.sort_by(|(lhs_score, lhs_ord), (rhs_score, rhs_ord)| {
            rhs_score.total_cmp(lhs_score).then(lhs_ord.cmp(rhs_ord))
        });

        Ok(Some(
            ranked
                .into_iter()
                .filter_map(|(_, ord)| self.index.actor_at(ord))
                .collect(),
        ))
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.query_analyzer()?;
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        while stream.advance() {
            let term = stream.token().text.clone();
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        Ok(terms)
    }

    /// Every term must match at least one name field, exactly or fuzzily
    fn build_query(&self, terms: &[String]) -> BooleanQuery {
        let fields = self.index.fields();
        let clauses = terms
            .iter()
            .map(|term| {
                let term_query: Box<dyn Query> = Box::new(self.build_term_query(&fields, term));
                (Occur::Must, term_query)
            })
            .collect();
        BooleanQuery::new(clauses)
    }

    fn build_term_query(&self, fields: &IndexFields, text: &str) -> BooleanQuery {
        let distance = if text.chars().count() >= self.options.min_fuzzy_term_len {
            self.options.fuzzy_distance
        } else {
            0
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for field in fields.searchable() {
            let term = Term::from_field_text(field, text);
            let exact = TermQuery::new(term.clone(), IndexRecordOption::WithFreqs);
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(exact), self.options.exact_boost)),
            ));
            clauses.push((
                Occur::Should,
                Box::new(FuzzyTermQuery::new_prefix(term, distance, true)),
            ));
        }
        BooleanQuery::new(clauses)
    }

    fn doc_ord(&self, searcher: &tantivy::Searcher, address: DocAddress) -> Result<Option<u64>> {
        let doc: TantivyDocument = searcher.doc(address)?;
        Ok(doc
            .get_first(self.index.fields().ord)
            .and_then(|value| value.as_u64()))
    }
}

impl ItemSearch for LocalizedSearch {
    fn search(&self, text: &str) -> Option<Vec<Actor>> {
        match self.try_search(text) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Search for {:?} in locale {} failed: {:#}", text, self.locale, e);
                Some(Vec::new())
            }
        }
    }

    fn locale(&self) -> Option<&str> {
        Some(&self.locale)
    }
}
