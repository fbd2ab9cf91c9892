// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! CitationQualityAggregator: sagacity-weighted citation review and
//! confidence propagation.
//!
//! Reviewer input is 1–5 per dimension; public scores are the weighted
//! mean normalized to [0, 1]. The composite quality score multiplies the
//! three integrity dimensions (objectivity, credibility, clarity) before
//! averaging, so one bad dimension drags the whole score down. Linked
//! articles take the mean quality of their citations as confidence.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::application::{EventBus, PermissionGate, SagacityEngine};
use crate::domain::{
    AgentId, Citation, CitationId, CitationReview, DimensionScores, LedgerError, LedgerEvent,
    LedgerResult, ReviewScores, Tier,
};
use crate::infrastructure::repository::{ArticleRepository, CitationRepository};
use crate::infrastructure::TargetLockRegistry;

pub struct CitationQualityAggregator {
    citations: Arc<dyn CitationRepository>,
    articles: Arc<dyn ArticleRepository>,
    sagacity: Arc<SagacityEngine>,
    locks: Arc<TargetLockRegistry>,
    event_bus: Arc<dyn EventBus>,
}

impl CitationQualityAggregator {
    pub fn new(
        citations: Arc<dyn CitationRepository>,
        articles: Arc<dyn ArticleRepository>,
        sagacity: Arc<SagacityEngine>,
        locks: Arc<TargetLockRegistry>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self { citations, articles, sagacity, locks, event_bus }
    }

    /// Record (or overwrite) an agent's review of a citation and fold it
    /// into the public scores. Returns the new composite quality score.
    pub async fn record_review(
        &self,
        agent_id: &AgentId,
        citation_id: CitationId,
        scores: ReviewScores,
    ) -> LedgerResult<f64> {
        self.sagacity.require_tier(agent_id, Tier::Reviewer).await?;
        if !scores.is_valid() {
            return Err(LedgerError::Validation(
                "review scores must be integers in 1..=5".to_string(),
            ));
        }
        let weight = self.sagacity.current_weight(agent_id).await?;

        let _guard = self.locks.acquire(&format!("citation:{citation_id}")).await;

        let mut citation = self
            .citations
            .find_by_id(citation_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("citation", citation_id))?;

        let now = Utc::now();
        self.citations
            .save_review(&CitationReview {
                citation_id,
                agent_id: agent_id.clone(),
                scores,
                weight,
                timestamp: now,
            })
            .await?;

        let reviews = self.citations.reviews_for(citation_id).await?;
        citation.scores = aggregate_dimensions(&reviews);
        citation.quality_score = composite_quality(&reviews);
        self.citations.save(&citation).await?;

        self.propagate_confidence(citation_id).await?;

        info!(citation = %citation_id, agent = %agent_id, quality = citation.quality_score,
              "citation reviewed");
        self.event_bus
            .publish(LedgerEvent::CitationReviewed {
                citation_id,
                agent_id: agent_id.clone(),
                quality_score: citation.quality_score,
                timestamp: now,
            })
            .await?;

        Ok(citation.quality_score)
    }

    /// Recompute confidence for every article linking the citation:
    /// mean quality over the article's citations, 0.5 when it has none.
    async fn propagate_confidence(&self, citation_id: CitationId) -> LedgerResult<()> {
        let linked = self.articles.find_by_citation(citation_id).await?;
        for mut article in linked {
            let mut sum = 0.0;
            let mut count = 0usize;
            for id in &article.citation_ids {
                if let Some(citation) = self.citations.find_by_id(*id).await? {
                    sum += citation.quality_score;
                    count += 1;
                }
            }
            article.confidence_score = if count == 0 { 0.5 } else { sum / count as f64 };
            article.touch();
            self.articles.save(&article).await?;
        }
        Ok(())
    }

    pub async fn citation(&self, citation_id: CitationId) -> LedgerResult<Citation> {
        self.citations
            .find_by_id(citation_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("citation", citation_id))
    }
}

/// Weighted mean per dimension, normalized from the 1–5 input scale:
/// `Σ(score·w) / (5·Σw)`.
fn aggregate_dimensions(reviews: &[CitationReview]) -> DimensionScores {
    let total_weight: f64 = reviews.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return DimensionScores::default();
    }
    let weighted = |pick: fn(&ReviewScores) -> u8| {
        let sum: f64 = reviews.iter().map(|r| pick(&r.scores) as f64 * r.weight).sum();
        sum / (5.0 * total_weight)
    };
    DimensionScores {
        objectivity: weighted(|s| s.objectivity),
        credibility: weighted(|s| s.credibility),
        accuracy: weighted(|s| s.accuracy),
        clarity: weighted(|s| s.clarity),
        completeness: weighted(|s| s.completeness),
    }
}

/// Multiplicative composite over the integrity dimensions:
/// `Σ(w·obj·cred·clar) / (125·Σw)`. The 125 divisor (5³) normalizes the
/// per-review product to [0, 1].
fn composite_quality(reviews: &[CitationReview]) -> f64 {
    let total_weight: f64 = reviews.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let sum: f64 = reviews
        .iter()
        .map(|r| {
            r.weight
                * r.scores.objectivity as f64
                * r.scores.credibility as f64
                * r.scores.clarity as f64
        })
        .sum();
    sum / (125.0 * total_weight)
}
