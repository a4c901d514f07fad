//! # Query Engine
//!
//! ## Purpose
//! Query operations layered over the index store: free-text search plus
//! similar-sections lookup, where a known provision is used as the query and
//! excluded from its own results.

use crate::errors::{Result, SearchError};
use crate::store::{rank_hits, LegalIndexStore, ScoredRecord};
use std::sync::Arc;

/// Search operations over the store's current snapshot.
pub struct QueryEngine {
    store: Arc<LegalIndexStore>,
}

impl QueryEngine {
    /// Create a query engine over the given store
    pub fn new(store: Arc<LegalIndexStore>) -> Self {
        Self { store }
    }

    /// Free-text search; see [`LegalIndexStore::search`].
    pub async fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<ScoredRecord>> {
        self.store.search(query_text, top_k).await
    }

    /// Find the sections most similar to a known section.
    ///
    /// Matches `section_id` case-insensitively against record `section`
    /// fields, first match in record order; no match yields an empty result.
    /// The matched record's searchable text becomes the query, `top_k + 1`
    /// neighbors are requested, and the queried record itself is excluded by
    /// index identity rather than by dropping the first result slot, so a
    /// corpus with duplicate or near-identical sections still excludes the
    /// right entry. Fewer than `top_k` remaining records yield fewer results.
    pub async fn similar_to(&self, section_id: &str, top_k: usize) -> Result<Vec<ScoredRecord>> {
        let snapshot = self.store.snapshot().ok_or(SearchError::StoreNotReady)?;

        let Some(position) = snapshot
            .records()
            .iter()
            .position(|r| r.section.eq_ignore_ascii_case(section_id))
        else {
            tracing::debug!("No section matching '{}' in the corpus", section_id);
            return Ok(Vec::new());
        };

        let query_text = snapshot.records()[position].searchable_text();
        let hits = self
            .store
            .query_snapshot(&snapshot, &query_text, top_k.saturating_add(1))
            .await?;

        let remaining: Vec<_> = hits
            .into_iter()
            .filter(|hit| hit.position != position)
            .take(top_k)
            .collect();

        Ok(rank_hits(&snapshot, remaining))
    }
}
