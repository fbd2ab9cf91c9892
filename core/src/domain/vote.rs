// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Governance votes.
//!
//! A vote binds one agent to one target (a task or an article). The stored
//! weight is a snapshot from cast time kept for audit purposes only: the
//! ledger recomputes consensus totals from each voter's current sagacity,
//! never from this column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::agent::AgentId;
use super::task::TaskId;

/// The entity a vote applies to. Exactly one of task or article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum VoteTarget {
    Task(TaskId),
    Article(String),
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteTarget::Task(id) => write!(f, "task:{id}"),
            VoteTarget::Article(slug) => write!(f, "article:{slug}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub agent_id: AgentId,
    pub target: VoteTarget,
    /// Sagacity snapshot at cast time. Informational; not authoritative for
    /// consensus recompute.
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display_keys() {
        let task = VoteTarget::Task(TaskId::from_description("x"));
        let article = VoteTarget::Article("mycelial-network".to_string());
        assert!(task.to_string().starts_with("task:"));
        assert_eq!(article.to_string(), "article:mycelial-network");
    }
}
