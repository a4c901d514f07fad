//! # Legal Index Store
//!
//! ## Purpose
//! The stateful core of the engine. Owns the embedding capability and the
//! current index snapshot; builds snapshots from a corpus directory, answers
//! nearest-neighbor searches, and derives statistics.
//!
//! ## Input/Output Specification
//! - **Input**: Corpus directory path (build), query text + k (search)
//! - **Output**: Immutable snapshots, ranked `ScoredRecord` sequences, stats
//! - **Invariant**: records and index vectors are co-indexed and equal length
//!
//! ## Concurrency
//! A snapshot is immutable once published. `build` assembles the complete new
//! snapshot first and only then swaps the store's pointer under a brief write
//! lock, so concurrent searches either see the old snapshot or the new one,
//! never a partial state. Reads clone the `Arc` and drop the lock immediately.

use crate::corpus::CorpusLoader;
use crate::embedding::TextEmbedder;
use crate::errors::{Result, SearchError};
use crate::stats::{self, IndexStats};
use crate::vector::{l2_normalize, FlatInnerProductIndex, IndexHit, NearestNeighborIndex};
use crate::LegalRecord;
use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// One search result: a record plus its rank and similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    /// 1-based rank; 1 is the best match
    pub rank: usize,
    /// Raw inner-product similarity, in [-1, 1] for normalized vectors
    pub score: f32,
    /// The matched record
    #[serde(flatten)]
    pub record: LegalRecord,
}

/// Immutable pairing of records and the similarity index built from their
/// embeddings. Replaced wholesale on reload, never mutated in place.
pub struct IndexSnapshot {
    records: Vec<LegalRecord>,
    index: Box<dyn NearestNeighborIndex>,
}

impl std::fmt::Debug for IndexSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSnapshot")
            .field("records", &self.records.len())
            .field("index_size", &self.index.len())
            .finish()
    }
}

impl IndexSnapshot {
    /// Assemble a snapshot from records and their raw embedding vectors.
    ///
    /// Verifies the one-vector-per-record pairing and the uniform vector
    /// width, L2-normalizes every vector, and bulk-inserts into a fresh
    /// inner-product index.
    pub fn from_parts(
        records: Vec<LegalRecord>,
        mut embeddings: Vec<Vec<f32>>,
        dimension: usize,
    ) -> Result<Self> {
        if embeddings.len() != records.len() {
            return Err(SearchError::Internal {
                message: format!(
                    "embedding count {} does not match record count {}",
                    embeddings.len(),
                    records.len()
                ),
            });
        }

        for vector in &embeddings {
            if vector.len() != dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }

        for vector in embeddings.iter_mut() {
            l2_normalize(vector);
        }

        let mut index = FlatInnerProductIndex::new(dimension);
        index.add_batch(&embeddings)?;

        Ok(Self {
            records,
            index: Box::new(index),
        })
    }

    /// The indexed records, in index-position order
    pub fn records(&self) -> &[LegalRecord] {
        &self.records
    }

    /// Number of vectors in the similarity index
    pub fn index_size(&self) -> usize {
        self.index.len()
    }

    /// Whether the snapshot indexes no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The process-wide store handle: embedder plus the current snapshot.
pub struct LegalIndexStore {
    embedder: Arc<dyn TextEmbedder>,
    current: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl LegalIndexStore {
    /// Create a store with no snapshot; queries fail with `StoreNotReady`
    /// until the first successful `build`.
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            embedder,
            current: RwLock::new(None),
        }
    }

    /// Identifier of the embedding model backing this store
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Whether a snapshot has ever been successfully built
    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// The currently published snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.current.read().clone()
    }

    /// Build a snapshot from the corpus directory and publish it.
    ///
    /// The entire corpus is embedded in one batch. An empty corpus produces a
    /// valid empty snapshot. Embedding and dimension errors are fatal to this
    /// build attempt and leave any previously published snapshot current.
    pub async fn build<P: AsRef<Path>>(&self, corpus_path: P) -> Result<Arc<IndexSnapshot>> {
        let corpus_path = corpus_path.as_ref();
        tracing::info!("Building index from corpus at {:?}", corpus_path);

        let records = CorpusLoader::new(corpus_path).load();
        let texts: Vec<String> = records.iter().map(|r| r.searchable_text()).collect();

        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed(&texts).await?
        };

        let snapshot = Arc::new(IndexSnapshot::from_parts(
            records,
            embeddings,
            self.embedder.dimension(),
        )?);

        tracing::info!(
            "Index built with {} records ({} vectors)",
            snapshot.records().len(),
            snapshot.index_size()
        );

        // Publish: the only moment the write lock is held
        *self.current.write() = Some(snapshot.clone());

        Ok(snapshot)
    }

    /// Search the current snapshot by free text.
    ///
    /// Returns `StoreNotReady` when no snapshot has ever been built; an empty
    /// snapshot yields an empty result sequence, never an error.
    pub async fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<ScoredRecord>> {
        let snapshot = self.snapshot().ok_or(SearchError::StoreNotReady)?;
        let hits = self.query_snapshot(&snapshot, query_text, top_k).await?;
        Ok(rank_hits(&snapshot, hits))
    }

    /// Raw nearest-neighbor query against a specific snapshot, returning index
    /// positions. The query engine uses this to apply its own exclusion before
    /// ranking.
    pub(crate) async fn query_snapshot(
        &self,
        snapshot: &IndexSnapshot,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<IndexHit>> {
        if snapshot.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.embed(&[query_text.to_string()]).await?;
        let mut query_vector = vectors.pop().ok_or_else(|| SearchError::EmbeddingFailure {
            details: "embedder returned no vector for the query".to_string(),
        })?;
        l2_normalize(&mut query_vector);

        let top_k = top_k.min(snapshot.index_size());
        snapshot.index.search(&query_vector, top_k)
    }

    /// Statistics for the current snapshot; `StoreNotReady` before first build.
    pub fn get_stats(&self) -> Result<IndexStats> {
        let snapshot = self.snapshot().ok_or(SearchError::StoreNotReady)?;
        Ok(stats::collect(&snapshot, self.embedder.model_name()))
    }
}

/// Convert raw hits to ranked records. Positions without a backing record
/// (sentinel values from an index implementation) are dropped silently.
pub(crate) fn rank_hits(snapshot: &IndexSnapshot, hits: Vec<IndexHit>) -> Vec<ScoredRecord> {
    hits.into_iter()
        .filter_map(|hit| snapshot.records().get(hit.position).map(|r| (r, hit.score)))
        .enumerate()
        .map(|(i, (record, score))| ScoredRecord {
            rank: i + 1,
            score,
            record: record.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    const DIM: usize = 64;

    fn write_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn fixture_corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "constitution.json",
            r#"{
                "parts": {
                    "part3": {
                        "title": "Part III - Fundamental Rights",
                        "articles": {
                            "Article 21": {
                                "title": "Protection of life and personal liberty",
                                "content": "Protection of life and personal liberty"
                            }
                        }
                    }
                }
            }"#,
        );
        write_file(
            dir.path(),
            "ipc.json",
            r#"{"sections": [
                {"section": "Section 420", "title": "Cheating", "text": "Whoever cheats and thereby dishonestly induces", "type": "ipc"},
                {"section": "Section 302", "title": "Punishment for murder", "text": "Whoever commits murder shall be punished", "type": "ipc"}
            ]}"#,
        );
        dir
    }

    fn store() -> LegalIndexStore {
        LegalIndexStore::new(Arc::new(HashingEmbedder::new(DIM)))
    }

    #[tokio::test]
    async fn build_upholds_record_index_invariant() {
        let corpus = fixture_corpus();
        let store = store();
        let snapshot = store.build(corpus.path()).await.unwrap();

        assert_eq!(snapshot.records().len(), snapshot.index_size());
        assert_eq!(snapshot.records().len(), 3);
    }

    #[tokio::test]
    async fn search_scores_never_increase() {
        let corpus = fixture_corpus();
        let store = store();
        store.build(corpus.path()).await.unwrap();

        let results = store.search("whoever cheats", 3).await.unwrap();
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.rank, i + 1);
        }
    }

    #[tokio::test]
    async fn oversized_top_k_is_clamped_not_an_error() {
        let corpus = fixture_corpus();
        let store = store();
        store.build(corpus.path()).await.unwrap();

        let results = store.search("murder", 100).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn article_21_scenario() {
        // Corpus of one constitution file: Part III -> Article 21
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "constitution.json",
            r#"{
                "parts": {
                    "part3": {
                        "title": "Part III - Fundamental Rights",
                        "articles": {
                            "Article 21": {
                                "title": "Protection of life and personal liberty",
                                "content": "Protection of life and personal liberty"
                            }
                        }
                    }
                }
            }"#,
        );
        let store = store();
        store.build(dir.path()).await.unwrap();

        let results = store.search("right to life", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.section, "Article 21");
        assert_eq!(
            results[0].record.part.as_deref(),
            Some("Part III - Fundamental Rights")
        );
    }

    #[tokio::test]
    async fn empty_corpus_builds_and_searches_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store();
        let snapshot = store.build(dir.path()).await.unwrap();

        assert!(snapshot.is_empty());
        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_documents, 0);

        let results = store.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_corpus_directory_builds_empty() {
        let store = store();
        let snapshot = store
            .build(PathBuf::from("/no/such/dataset"))
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn unbuilt_store_reports_not_ready() {
        let store = store();
        assert!(!store.is_ready());

        let err = store.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::StoreNotReady));

        let err = store.get_stats().unwrap_err();
        assert!(matches!(err, SearchError::StoreNotReady));
    }

    #[tokio::test]
    async fn rebuild_from_unchanged_corpus_is_deterministic() {
        let corpus = fixture_corpus();
        let store = store();

        store.build(corpus.path()).await.unwrap();
        let first: Vec<String> = store
            .search("dishonestly induces", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.record.section)
            .collect();

        store.build(corpus.path()).await.unwrap();
        let second: Vec<String> = store
            .search("dishonestly induces", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.record.section)
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stats_total_equals_sum_of_type_counts() {
        let corpus = fixture_corpus();
        let store = store();
        store.build(corpus.path()).await.unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(
            stats.document_types.values().sum::<usize>(),
            stats.total_documents
        );
        assert_eq!(stats.index_size, stats.total_documents);
        assert_eq!(
            stats.source_files,
            vec!["constitution.json", "ipc.json"]
        );
    }

    /// Embedder that can be switched into a failing mode mid-test.
    struct FlakyEmbedder {
        inner: HashingEmbedder,
        fail: AtomicBool,
    }

    #[async_trait]
    impl TextEmbedder for FlakyEmbedder {
        fn model_name(&self) -> &str {
            self.inner.model_name()
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SearchError::EmbeddingFailure {
                    details: "model offline".to_string(),
                });
            }
            self.inner.embed(texts).await
        }
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_snapshot() {
        let corpus = fixture_corpus();
        let embedder = Arc::new(FlakyEmbedder {
            inner: HashingEmbedder::new(DIM),
            fail: AtomicBool::new(false),
        });
        let store = LegalIndexStore::new(embedder.clone());

        store.build(corpus.path()).await.unwrap();
        embedder.fail.store(true, Ordering::SeqCst);

        let err = store.build(corpus.path()).await.unwrap_err();
        assert!(matches!(err, SearchError::EmbeddingFailure { .. }));

        // The stale snapshot still serves queries
        embedder.fail.store(false, Ordering::SeqCst);
        let results = store.search("murder", 2).await.unwrap();
        assert!(!results.is_empty());
    }

    /// Embedder that advertises one width and delivers another.
    struct LyingEmbedder;

    #[async_trait]
    impl TextEmbedder for LyingEmbedder {
        fn model_name(&self) -> &str {
            "lying"
        }

        fn dimension(&self) -> usize {
            DIM
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0f32; DIM + 1]).collect())
        }
    }

    #[tokio::test]
    async fn inconsistent_vector_width_fails_the_build() {
        let corpus = fixture_corpus();
        let store = LegalIndexStore::new(Arc::new(LyingEmbedder));

        let err = store.build(corpus.path()).await.unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
        assert!(!store.is_ready());
    }
}
