//! # Legal Semantic Search Engine
//!
//! ## Overview
//! This library implements a semantic search engine for Indian statutory law
//! (constitutional articles, penal-code and procedure-code sections, contract-act
//! clauses). Heterogeneous legal-document JSON is normalized into a flat record
//! collection, embedded into a vector space, and served through nearest-neighbor
//! queries with stable ranking and scoring.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `corpus`: Dataset discovery and document-shape normalization
//! - `embedding`: Text embedding capability (remote endpoint or deterministic hashing)
//! - `vector`: Inner-product nearest-neighbor index and vector normalization
//! - `store`: The stateful index store with atomic snapshot replacement
//! - `query`: Search-by-text and similar-sections query operations
//! - `stats`: Aggregate corpus statistics
//! - `api`: REST API endpoints over the store
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Legal document corpus (JSON files), search queries (text)
//! - **Output**: Ranked search results with record metadata and similarity scores
//! - **Ranking**: Cosine similarity over L2-normalized embeddings, deterministic order
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use legal_semantic_search::{Config, LegalIndexStore, embedding};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let embedder = embedding::embedder_from_config(&config.embedding)?;
//!     let store = Arc::new(LegalIndexStore::new(embedder));
//!     store.build(&config.corpus.dataset_dir).await?;
//!     let results = store.search("right to life", 3).await?;
//!     println!("Found {} results", results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod corpus;
pub mod embedding;
pub mod vector;
pub mod store;
pub mod query;
pub mod stats;
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use query::QueryEngine;
pub use stats::IndexStats;
pub use store::{IndexSnapshot, LegalIndexStore, ScoredRecord};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One indexed legal provision: the atomic unit of the store.
///
/// Records are produced by the corpus normalizer from any of the recognized
/// document shapes. Field defaults are forgiving on purpose: a record with an
/// empty `section` or `text` is still indexed, only its searchable text shrinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalRecord {
    /// Section identifier, e.g. "Article 21" or "Section 420"
    #[serde(default)]
    pub section: String,
    /// Human-readable heading
    #[serde(default)]
    pub title: String,
    /// Substantive content of the provision
    #[serde(default)]
    pub text: String,
    /// Constitutional "Part" grouping; absent for non-constitutional sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    /// Provenance tag: "constitution", "ipc", "crpc", "contract_act", or "legal"
    #[serde(rename = "type", default = "default_doc_type")]
    pub doc_type: String,
    /// Name of the corpus file the record came from
    #[serde(default)]
    pub source_file: String,
    /// Optional keywords, used only to enrich the searchable text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

pub(crate) fn default_doc_type() -> String {
    "legal".to_string()
}

impl LegalRecord {
    /// Text submitted to the embedding model for this record.
    ///
    /// Concatenates `section`, `title`, `text` and `keywords`, space-joined in
    /// that fixed order. Empty fields contribute nothing rather than a
    /// placeholder, so two records differing only in which fields are blank
    /// still embed differently.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.section.is_empty() {
            parts.push(&self.section);
        }
        if !self.title.is_empty() {
            parts.push(&self.title);
        }
        if !self.text.is_empty() {
            parts.push(&self.text);
        }
        for keyword in &self.keywords {
            if !keyword.is_empty() {
                parts.push(keyword);
            }
        }
        parts.join(" ")
    }
}

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub store: Arc<store::LegalIndexStore>,
    pub query_engine: Arc<query::QueryEngine>,
}
