// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Governance configuration.
//!
//! All thresholds and TTLs are configuration, not code constants, so a
//! deployment can tune consensus policy without a rebuild. Loadable from
//! YAML; every field has a default matching the reference policy.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::agent::AgentId;
use super::exam::ExamBank;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Distinguished root identity, exempt from certification expiry and
    /// tier floors.
    pub root_agent_id: AgentId,

    /// Days a certification remains valid.
    pub certification_ttl_days: i64,
    /// Minutes a started exam stays submittable.
    pub exam_ttl_minutes: i64,
    /// Minutes a bind challenge stays verifiable.
    pub challenge_ttl_minutes: i64,

    /// Absolute sagacity floor below which an agent is an Observer.
    pub observer_floor: f64,

    /// Task `proposed -> active` weight threshold.
    pub task_activation_threshold: f64,
    /// Article `needs-review -> active` weight threshold.
    pub article_activation_threshold: f64,
    /// Distinct voters required alongside the article weight threshold.
    pub article_min_voters: usize,
    /// Isomorphism `proposed -> verified` endorsement weight threshold.
    pub isomorphism_verification_threshold: f64,
    pub isomorphism_min_endorsers: usize,

    /// Alignment penalty for a citation tag with no link record.
    pub missing_link_penalty: f64,
    /// Alignment penalty for a citation tag whose global record is missing.
    pub missing_record_penalty: f64,

    /// Question bank exams are drawn from.
    pub exam_bank: ExamBank,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            root_agent_id: AgentId::new("agent:root"),
            certification_ttl_days: 30,
            exam_ttl_minutes: 60,
            challenge_ttl_minutes: 30,
            observer_floor: 0.1,
            task_activation_threshold: 0.5,
            article_activation_threshold: 1.0,
            article_min_voters: 2,
            isomorphism_verification_threshold: 1.0,
            isomorphism_min_endorsers: 2,
            missing_link_penalty: 0.05,
            missing_record_penalty: 0.1,
            exam_bank: ExamBank::default(),
        }
    }
}

impl GovernanceConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn certification_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.certification_ttl_days)
    }

    pub fn exam_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.exam_ttl_minutes)
    }

    pub fn challenge_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.challenge_ttl_minutes)
    }

    pub fn is_root(&self, agent_id: &AgentId) -> bool {
        *agent_id == self.root_agent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_policy() {
        let config = GovernanceConfig::default();
        assert_eq!(config.certification_ttl_days, 30);
        assert_eq!(config.observer_floor, 0.1);
        assert_eq!(config.task_activation_threshold, 0.5);
        assert_eq!(config.article_activation_threshold, 1.0);
        assert_eq!(config.article_min_voters, 2);
        assert_eq!(config.missing_link_penalty, 0.05);
        assert_eq!(config.missing_record_penalty, 0.1);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: GovernanceConfig =
            serde_yaml::from_str("root_agent_id: \"agent:steward\"\ntask_activation_threshold: 0.7\n").unwrap();
        assert_eq!(config.root_agent_id, AgentId::new("agent:steward"));
        assert_eq!(config.task_activation_threshold, 0.7);
        assert_eq!(config.article_min_voters, 2);
    }
}
