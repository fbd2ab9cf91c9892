// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Isomorphism entity: a proposed structural correspondence between two
//! articles' relational maps.
//!
//! Isomorphisms are created by the discovery pipeline, promoted to
//! `Verified` by live-reweighted endorsements, and consumed read-only by
//! the property-transfer and synthesis engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::agent::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct IsomorphismId(pub Uuid);

impl IsomorphismId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IsomorphismId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IsomorphismId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsomorphismStatus {
    Proposed,
    Verified,
    Disputed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Isomorphism {
    pub id: IsomorphismId,
    /// Ordered pair of article slugs; the mapping reads A → B.
    pub article_a: String,
    pub article_b: String,
    /// Node-to-node correspondence. Also carries confirmed property
    /// mappings written back by the transfer engine.
    pub mapping: BTreeMap<String, String>,
    pub status: IsomorphismStatus,
    /// Structural similarity at proposal time.
    pub confidence_score: f64,
    pub isomorphic: bool,
    pub subgraph_isomorphic: bool,
    /// Distinct endorsing agents. Endorsement weight is recomputed from
    /// each endorser's current sagacity, like votes.
    pub endorsers: Vec<AgentId>,
    /// Cached endorsement weight from the last recompute.
    pub total_weight: f64,
    pub proposed_by: Option<AgentId>,
    pub created_at: DateTime<Utc>,
}

impl Isomorphism {
    pub fn propose(
        article_a: impl Into<String>,
        article_b: impl Into<String>,
        mapping: BTreeMap<String, String>,
        confidence_score: f64,
        proposed_by: Option<AgentId>,
    ) -> Self {
        Self {
            id: IsomorphismId::new(),
            article_a: article_a.into(),
            article_b: article_b.into(),
            mapping,
            status: IsomorphismStatus::Proposed,
            confidence_score,
            isomorphic: false,
            subgraph_isomorphic: false,
            endorsers: Vec::new(),
            total_weight: 0.0,
            proposed_by,
            created_at: Utc::now(),
        }
    }

    /// Add an endorser, ignoring duplicates. Returns whether the set grew.
    pub fn add_endorser(&mut self, agent_id: AgentId) -> bool {
        if self.endorsers.contains(&agent_id) {
            false
        } else {
            self.endorsers.push(agent_id);
            true
        }
    }
}
