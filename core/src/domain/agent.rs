// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent aggregate: identity, sagacity scores, and permission tiers.
//!
//! Sagacity is the agent's governance weight, defined as the minimum of the
//! competence and alignment scores. The stored `sagacity` field is kept in
//! sync with the component scores by every mutator on this type; readers
//! that need expiry-aware values go through `SagacityEngine`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score assigned to both component scores at auto-registration.
pub const REGISTRATION_FLOOR: f64 = 0.1;

/// Agent identifier, e.g. `agent:aragog`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permission tier derived from sagacity.
///
/// Strictly ordered; each tier inherits the permissions of the tiers below
/// it, so permission checks are `tier >= floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Observer,
    Contributor,
    Voter,
    Reviewer,
    Architect,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Observer => "observer",
            Tier::Contributor => "contributor",
            Tier::Voter => "voter",
            Tier::Reviewer => "reviewer",
            Tier::Architect => "architect",
        };
        write!(f, "{name}")
    }
}

/// An autonomous agent participating in governance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Exam-derived competence score, [0, 1].
    pub competence_score: f64,
    /// Exam-derived alignment score, [0, 1]. Lowered by integrity penalties.
    pub alignment_score: f64,
    /// Derived: `min(competence_score, alignment_score)`, floored at 0.
    pub sagacity: f64,
    /// Timestamp of the last passed certification exam. `None` until the
    /// agent has certified at least once.
    pub last_certified_at: Option<DateTime<Utc>>,
    pub contributions: u64,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Register a new agent at the floor scores. The agent carries no
    /// certification yet, so its expiry-aware sagacity is zero until it
    /// passes its first exam.
    pub fn register(id: AgentId) -> Self {
        let mut agent = Self {
            id,
            competence_score: REGISTRATION_FLOOR,
            alignment_score: REGISTRATION_FLOOR,
            sagacity: 0.0,
            last_certified_at: None,
            contributions: 0,
            created_at: Utc::now(),
        };
        agent.recompute_sagacity();
        agent
    }

    /// Restore the `sagacity == min(competence, alignment)` invariant.
    pub fn recompute_sagacity(&mut self) {
        self.sagacity = self.competence_score.min(self.alignment_score).max(0.0);
    }

    /// Record a passed certification exam. The only path that can raise
    /// sagacity above the registration floor.
    pub fn certify(&mut self, competence: f64, alignment: f64, now: DateTime<Utc>) {
        self.competence_score = competence.clamp(0.0, 1.0);
        self.alignment_score = alignment.clamp(0.0, 1.0);
        self.last_certified_at = Some(now);
        self.recompute_sagacity();
    }

    /// Apply an integrity penalty to the alignment score, floored at zero.
    /// Competence is untouched: alignment is deliberately easier to damage
    /// than to repair.
    pub fn penalise_alignment(&mut self, amount: f64) {
        self.alignment_score = (self.alignment_score - amount).max(0.0);
        self.recompute_sagacity();
    }

    /// Whether the last certification is still inside the TTL window.
    pub fn certified_within(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.last_certified_at {
            Some(at) => now - at < ttl,
            None => false,
        }
    }

    pub fn record_contribution(&mut self) {
        self.contributions += 1;
    }
}
