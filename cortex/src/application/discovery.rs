// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! CandidateDiscovery: nearest-neighbour search for cross-domain analogy
//! candidates.
//!
//! Discovery is best-effort and eventually consistent: the index is
//! maintained externally, and a per-article index failure is logged and
//! skipped rather than aborting the scan.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use noograph_core::domain::{ArticleStatus, LedgerResult};
use noograph_core::infrastructure::repository::ArticleRepository;

use crate::domain::CortexConfig;
use crate::infrastructure::{SearchHit, VectorIndex};

/// A canonicalized cross-domain candidate pair: `a < b` always, so a
/// symmetric discovery never yields the same pair twice.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub article_a: String,
    pub article_b: String,
    pub score: f32,
}

impl CandidatePair {
    fn canonical(first: &str, second: &str, score: f32) -> Self {
        let (article_a, article_b) = if first <= second {
            (first.to_string(), second.to_string())
        } else {
            (second.to_string(), first.to_string())
        };
        Self { article_a, article_b, score }
    }
}

pub struct CandidateDiscovery {
    articles: Arc<dyn ArticleRepository>,
    index: Arc<dyn VectorIndex>,
    config: Arc<CortexConfig>,
}

impl CandidateDiscovery {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        index: Arc<dyn VectorIndex>,
        config: Arc<CortexConfig>,
    ) -> Self {
        Self { articles, index, config }
    }

    /// Nearest neighbours of an embedding, descending by cosine score.
    pub async fn find_candidates(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> LedgerResult<Vec<SearchHit>> {
        Ok(self.index.search(embedding, threshold, limit).await?)
    }

    /// Scan every active article for cross-domain analogy candidates.
    /// Same-domain and self hits are dropped; symmetric pairs are
    /// canonicalized and deduplicated.
    pub async fn cross_domain_scan(&self) -> LedgerResult<Vec<CandidatePair>> {
        let articles = self.articles.list_by_status(ArticleStatus::Active).await?;

        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
        let mut pairs = Vec::new();

        for article in &articles {
            let vector = match self.index.retrieve(&article.slug).await {
                Ok(Some(vector)) => vector,
                Ok(None) => {
                    debug!(article = %article.slug, "article not indexed, skipping");
                    continue;
                }
                Err(error) => {
                    warn!(article = %article.slug, %error, "vector index failure, skipping article");
                    continue;
                }
            };

            let hits = match self
                .index
                .search(
                    &vector,
                    self.config.similarity_threshold,
                    // Self always matches at 1.0; fetch one extra.
                    self.config.candidates_per_article + 1,
                )
                .await
            {
                Ok(hits) => hits,
                Err(error) => {
                    warn!(article = %article.slug, %error, "vector search failure, skipping article");
                    continue;
                }
            };

            for hit in hits {
                if hit.slug == article.slug {
                    continue;
                }
                let Some(candidate) = self.articles.find_by_slug(&hit.slug).await? else {
                    continue;
                };
                if candidate.domain.is_some() && candidate.domain == article.domain {
                    continue;
                }
                let pair = CandidatePair::canonical(&article.slug, &hit.slug, hit.score);
                if seen.insert((pair.article_a.clone(), pair.article_b.clone())) {
                    pairs.push(pair);
                }
            }
        }

        debug!(candidates = pairs.len(), "cross-domain scan complete");
        Ok(pairs)
    }
}
