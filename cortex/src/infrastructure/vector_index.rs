// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Vector index seam for candidate discovery.
//!
//! Discovery only needs three operations: upsert an article embedding,
//! search by cosine similarity, and retrieve a stored vector. The in-memory
//! implementation is the reference backend for development and testing; a
//! production deployment can put a dedicated vector store behind the same
//! trait.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A scored search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub slug: String,
    pub score: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace the embedding for a slug.
    async fn upsert(&self, slug: &str, vector: Vec<f32>) -> Result<()>;

    /// Cosine nearest-neighbour search, descending by score, hits below
    /// `threshold` dropped, at most `limit` results.
    async fn search(&self, vector: &[f32], threshold: f32, limit: usize) -> Result<Vec<SearchHit>>;

    /// The stored embedding for a slug, if indexed.
    async fn retrieve(&self, slug: &str) -> Result<Option<Vec<f32>>>;
}

#[derive(Default)]
pub struct InMemoryVectorIndex {
    vectors: RwLock<HashMap<String, Vec<f32>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, slug: &str, vector: Vec<f32>) -> Result<()> {
        let mut vectors = self.vectors.write();
        vectors.insert(slug.to_string(), vector);
        Ok(())
    }

    async fn search(&self, vector: &[f32], threshold: f32, limit: usize) -> Result<Vec<SearchHit>> {
        let vectors = self.vectors.read();
        let mut hits: Vec<SearchHit> = vectors
            .iter()
            .map(|(slug, stored)| SearchHit {
                slug: slug.clone(),
                score: cosine_similarity(vector, stored),
            })
            .filter(|hit| hit.score >= threshold)
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn retrieve(&self, slug: &str) -> Result<Option<Vec<f32>>> {
        let vectors = self.vectors.read();
        Ok(vectors.get(slug).cloned())
    }
}

/// Cosine similarity; 0.0 for mismatched dimensions or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let index = InMemoryVectorIndex::new();
        index.upsert("aligned", vec![1.0, 0.0]).await.unwrap();
        index.upsert("diagonal", vec![1.0, 1.0]).await.unwrap();
        index.upsert("orthogonal", vec![0.0, 1.0]).await.unwrap();

        let hits = index.search(&[1.0, 0.0], 0.5, 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].slug, "aligned");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].slug, "diagonal");
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let index = InMemoryVectorIndex::new();
        for i in 0..5 {
            index.upsert(&format!("a{i}"), vec![1.0, 0.1 * i as f32]).await.unwrap();
        }
        let hits = index.search(&[1.0, 0.0], 0.0, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let index = InMemoryVectorIndex::new();
        index.upsert("a", vec![1.0, 0.0]).await.unwrap();
        index.upsert("a", vec![0.0, 1.0]).await.unwrap();
        assert_eq!(index.retrieve("a").await.unwrap(), Some(vec![0.0, 1.0]));
    }

    #[test]
    fn test_cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[1.0, 1.0]) - 1.0).abs() < 1e-6);
    }
}
