//! # Vector Index Module
//!
//! ## Purpose
//! Nearest-neighbor search capability over embedding vectors. The store
//! consumes the capability through a trait; the default implementation is an
//! exact, brute-force inner-product scan over a flat buffer, which doubles as
//! cosine similarity once every stored and query vector is L2-normalized.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized embedding vectors (bulk insert), query vector, k
//! - **Output**: Top-k positions with scores, descending, ties broken by position
//! - **Scores**: Raw inner product, in [-1, 1] for normalized vectors

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// One nearest-neighbor hit: index position plus similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Position of the vector in insertion order
    pub position: usize,
    /// Inner-product similarity to the query
    pub score: f32,
}

/// Nearest-neighbor index capability consumed by the store.
pub trait NearestNeighborIndex: Send + Sync {
    /// Vector width the index was created for
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    /// Whether the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bulk-insert vectors in order; positions continue from the current length.
    fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<()>;

    /// Query the `top_k` most similar stored vectors by inner product.
    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<IndexHit>>;
}

/// Exact inner-product index over a flat row-major buffer.
pub struct FlatInnerProductIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatInnerProductIndex {
    /// Create an empty index for vectors of the given width
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }
}

impl NearestNeighborIndex for FlatInnerProductIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(SearchError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<IndexHit>> {
        if query.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<IndexHit> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| IndexHit {
                position,
                score: dot(row, query),
            })
            .collect();

        // Descending score; ties resolved by ascending position so ranking is
        // deterministic for identical vectors
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(top_k);

        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit length in place; zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(components: &[f32]) -> Vec<f32> {
        let mut v = components.to_vec();
        l2_normalize(&mut v);
        v
    }

    #[test]
    fn l2_normalize_produces_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_leaves_zero_vector_alone() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn search_returns_descending_scores() {
        let mut index = FlatInnerProductIndex::new(2);
        index
            .add_batch(&[unit(&[1.0, 0.0]), unit(&[0.0, 1.0]), unit(&[1.0, 1.0])])
            .unwrap();

        let hits = index.search(&unit(&[1.0, 0.0]), 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].position, 0);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn search_clamps_to_available_vectors() {
        let mut index = FlatInnerProductIndex::new(2);
        index.add_batch(&[unit(&[1.0, 0.0])]).unwrap();

        let hits = index.search(&unit(&[1.0, 0.0]), 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn identical_vectors_rank_by_position() {
        let mut index = FlatInnerProductIndex::new(2);
        let v = unit(&[1.0, 1.0]);
        index.add_batch(&[v.clone(), v.clone(), v.clone()]).unwrap();

        let hits = index.search(&v, 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn add_batch_rejects_wrong_width() {
        let mut index = FlatInnerProductIndex::new(3);
        let err = index.add_batch(&[vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn search_rejects_wrong_query_width() {
        let index = FlatInnerProductIndex::new(3);
        let err = index.search(&[1.0], 1).unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = FlatInnerProductIndex::new(2);
        let hits = index.search(&[1.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }
}
