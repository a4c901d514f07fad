//! # Corpus Loader
//!
//! ## Purpose
//! Enumerates the `*.json` files of a dataset directory, delegates each to the
//! document normalizer, and accumulates the resulting records into one ordered
//! sequence.
//!
//! ## Ordering
//! File names are sorted explicitly before loading so record positions (and
//! therefore index positions) are reproducible across platforms; within a file
//! the normalizer's emission order applies.
//!
//! ## Error Policy
//! A missing directory or an unreadable/unparseable file is logged and skipped;
//! loading never fails the caller.

use crate::corpus::normalize::normalize_document;
use crate::LegalRecord;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Loads every recognized document under one dataset directory.
pub struct CorpusLoader {
    dataset_dir: PathBuf,
}

impl CorpusLoader {
    /// Create a loader for the given dataset directory
    pub fn new<P: AsRef<Path>>(dataset_dir: P) -> Self {
        Self {
            dataset_dir: dataset_dir.as_ref().to_path_buf(),
        }
    }

    /// Load all records from the dataset directory.
    ///
    /// Returns an empty sequence when the directory is missing or holds no
    /// valid documents.
    pub fn load(&self) -> Vec<LegalRecord> {
        let entries = match std::fs::read_dir(&self.dataset_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Corpus unavailable at {:?}: {}, loading empty corpus",
                    self.dataset_dir,
                    e
                );
                return Vec::new();
            }
        };

        let mut file_names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "json"))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        // Deterministic record positions regardless of directory-listing order
        file_names.sort();

        let mut records = Vec::new();
        let mut loaded_files = 0usize;

        for file_name in &file_names {
            match self.load_file(file_name) {
                Ok(file_records) => {
                    tracing::debug!("Loaded {} records from {}", file_records.len(), file_name);
                    records.extend(file_records);
                    loaded_files += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file_name, e);
                }
            }
        }

        tracing::info!(
            "Loaded {} records from {}/{} corpus files in {:?}",
            records.len(),
            loaded_files,
            file_names.len(),
            self.dataset_dir
        );

        records
    }

    fn load_file(&self, file_name: &str) -> crate::Result<Vec<LegalRecord>> {
        let path = self.dataset_dir.join(file_name);
        let content = std::fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&content)?;
        normalize_document(&value, file_name)
    }
}
