// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Citation aggregate and per-agent citation reviews.
//!
//! Public dimension scores live on the citation in [0, 1]; reviewer input
//! arrives on a 1–5 integer scale and is normalized during aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CitationId(pub Uuid);

impl CitationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five reviewed quality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    Objectivity,
    Credibility,
    Accuracy,
    Clarity,
    Completeness,
}

/// Per-dimension public scores in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub objectivity: f64,
    pub credibility: f64,
    pub accuracy: f64,
    pub clarity: f64,
    pub completeness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: CitationId,
    pub url: String,
    pub title: String,
    pub scores: DimensionScores,
    /// Weighted-product composite over the integrity dimensions
    /// (objectivity, credibility, clarity).
    pub quality_score: f64,
    pub created_at: DateTime<Utc>,
}

impl Citation {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: CitationId::new(),
            url: url.into(),
            title: title.into(),
            scores: DimensionScores::default(),
            quality_score: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// Raw reviewer input: 1–5 integer per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewScores {
    pub objectivity: u8,
    pub credibility: u8,
    pub accuracy: u8,
    pub clarity: u8,
    pub completeness: u8,
}

impl ReviewScores {
    /// All dimensions must sit in the 1–5 input scale.
    pub fn is_valid(&self) -> bool {
        [
            self.objectivity,
            self.credibility,
            self.accuracy,
            self.clarity,
            self.completeness,
        ]
        .iter()
        .all(|s| (1..=5).contains(s))
    }
}

/// A single agent's review of a citation. Unique per (agent, citation);
/// re-reviewing overwrites scores, weight, and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationReview {
    pub citation_id: CitationId,
    pub agent_id: AgentId,
    pub scores: ReviewScores,
    /// Reviewer sagacity frozen at review time.
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}
