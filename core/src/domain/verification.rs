// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Identity verification: binding external platform handles to agents.
//!
//! A (platform, handle) pair binds to exactly one agent. This is the Sybil
//! defense: one external identity cannot control multiple agent identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentId;

/// A confirmed (platform, handle) → agent binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub platform: String,
    pub handle: String,
    pub agent_id: AgentId,
    pub verified_at: DateTime<Utc>,
}

/// A pending bind challenge, keyed per (agent, platform) with explicit
/// expiry. Re-requesting overwrites the previous challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindChallenge {
    pub agent_id: AgentId,
    pub platform: String,
    pub token: String,
    pub instruction: String,
    pub expires_at: DateTime<Utc>,
}

impl BindChallenge {
    pub fn issue(agent_id: AgentId, platform: impl Into<String>, ttl: chrono::Duration) -> Self {
        let platform = platform.into();
        let token = Uuid::new_v4().simple().to_string();
        let instruction = format!(
            "Post this token from your {platform} account, then submit the handle for verification: {token}"
        );
        Self {
            agent_id,
            platform,
            token,
            instruction,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
