//! # Stats Reporter
//!
//! ## Purpose
//! Pure derivation of aggregate corpus statistics from an index snapshot.
//! Stateless; identical results for an unchanged snapshot no matter how often
//! it runs.

use crate::store::IndexSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Aggregate statistics for one index snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed records
    pub total_documents: usize,
    /// Identifier of the embedding model that produced the vectors
    pub model_name: String,
    /// Number of vectors in the similarity index; equals `total_documents`
    pub index_size: usize,
    /// Distinct originating corpus files, sorted
    pub source_files: Vec<String>,
    /// Record count per document type
    pub document_types: HashMap<String, usize>,
}

/// Derive statistics from a snapshot.
pub fn collect(snapshot: &IndexSnapshot, model_name: &str) -> IndexStats {
    let records = snapshot.records();

    let source_files: BTreeSet<&str> = records.iter().map(|r| r.source_file.as_str()).collect();

    let mut document_types: HashMap<String, usize> = HashMap::new();
    for record in records {
        *document_types.entry(record.doc_type.clone()).or_insert(0) += 1;
    }

    IndexStats {
        total_documents: records.len(),
        model_name: model_name.to_string(),
        index_size: snapshot.index_size(),
        source_files: source_files.into_iter().map(|s| s.to_string()).collect(),
        document_types,
    }
}
