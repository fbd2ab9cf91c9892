// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Task aggregate: curation work items gated by weighted consensus.
//!
//! Task ids are content hashes of the task description, so proposing the
//! same description twice resolves to the same task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::agent::AgentId;

/// Task identifier: hex-encoded SHA-256 of the task description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TaskId(pub String);

impl TaskId {
    /// Derive the id from a task description. Stable and collision-resistant
    /// per description.
    pub fn from_description(description: &str) -> Self {
        let digest = Sha256::digest(description.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Proposed,
    Active,
    InProgress,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub claimed_by: Option<AgentId>,
    /// Cached consensus weight from the last recompute. Never summed from
    /// stored vote weights; see `ConsensusLedger`.
    pub total_weight: f64,
    pub proposed_by: Option<AgentId>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn propose(description: impl Into<String>, priority: TaskPriority, proposer: Option<AgentId>) -> Self {
        let description = description.into();
        Self {
            id: TaskId::from_description(&description),
            description,
            status: TaskStatus::Proposed,
            priority,
            claimed_by: None,
            total_weight: 0.0,
            proposed_by: proposer,
            created_at: Utc::now(),
        }
    }
}
