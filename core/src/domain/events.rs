// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the governance ledger.
//! Published to the EventBus for observability and downstream integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::{AgentId, Tier};
use super::citation::CitationId;
use super::isomorphism::IsomorphismId;
use super::task::TaskId;
use super::vote::VoteTarget;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// An agent was auto-registered on its first authenticated action.
    AgentRegistered {
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// An agent passed a certification exam.
    AgentCertified {
        agent_id: AgentId,
        competence_score: f64,
        alignment_score: f64,
        sagacity: f64,
        tier: Tier,
        timestamp: DateTime<Utc>,
    },

    /// The consistency audit penalised an agent's alignment score.
    SagacityPenalised {
        agent_id: AgentId,
        penalty: f64,
        new_sagacity: f64,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A vote was cast (or re-cast) on a task or article.
    VoteCast {
        agent_id: AgentId,
        target: VoteTarget,
        weight: f64,
        total_weight: f64,
        timestamp: DateTime<Utc>,
    },

    TaskProposed {
        task_id: TaskId,
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// A task crossed its consensus threshold.
    TaskActivated {
        task_id: TaskId,
        total_weight: f64,
        timestamp: DateTime<Utc>,
    },

    TaskClaimed {
        task_id: TaskId,
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },

    TaskCompleted {
        task_id: TaskId,
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// An article crossed its consensus threshold.
    ArticleActivated {
        slug: String,
        total_weight: f64,
        voter_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A citation review landed and quality propagated to linked articles.
    CitationReviewed {
        citation_id: CitationId,
        agent_id: AgentId,
        quality_score: f64,
        timestamp: DateTime<Utc>,
    },

    IsomorphismEndorsed {
        isomorphism_id: IsomorphismId,
        agent_id: AgentId,
        total_weight: f64,
        timestamp: DateTime<Utc>,
    },

    IsomorphismVerified {
        isomorphism_id: IsomorphismId,
        total_weight: f64,
        endorser_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The synthesis engine created or refreshed a primitive article.
    PrimitiveSynthesized {
        isomorphism_id: IsomorphismId,
        slug: String,
        updated: bool,
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Stable event-type string for logging and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::AgentRegistered { .. } => "agent_registered",
            LedgerEvent::AgentCertified { .. } => "agent_certified",
            LedgerEvent::SagacityPenalised { .. } => "sagacity_penalised",
            LedgerEvent::VoteCast { .. } => "vote_cast",
            LedgerEvent::TaskProposed { .. } => "task_proposed",
            LedgerEvent::TaskActivated { .. } => "task_activated",
            LedgerEvent::TaskClaimed { .. } => "task_claimed",
            LedgerEvent::TaskCompleted { .. } => "task_completed",
            LedgerEvent::ArticleActivated { .. } => "article_activated",
            LedgerEvent::CitationReviewed { .. } => "citation_reviewed",
            LedgerEvent::IsomorphismEndorsed { .. } => "isomorphism_endorsed",
            LedgerEvent::IsomorphismVerified { .. } => "isomorphism_verified",
            LedgerEvent::PrimitiveSynthesized { .. } => "primitive_synthesized",
        }
    }
}
