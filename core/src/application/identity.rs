// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! IdentityService: agent auto-registration and external handle binding.
//!
//! Binding is a challenge-response flow: the agent requests a challenge for
//! a platform, posts the token from the external account, then submits the
//! handle. A (platform, handle) pair binds to exactly one agent, which is
//! the ledger's Sybil defense.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::application::{sagacity, EventBus};
use crate::domain::{
    Agent, AgentId, BindChallenge, GovernanceConfig, LedgerError, LedgerResult, Verification,
};
use crate::infrastructure::repository::{AgentRepository, VerificationRepository};
use crate::infrastructure::KeyedTtlStore;

pub struct IdentityService {
    agents: Arc<dyn AgentRepository>,
    verifications: Arc<dyn VerificationRepository>,
    event_bus: Arc<dyn EventBus>,
    config: Arc<GovernanceConfig>,
    challenges: KeyedTtlStore<BindChallenge>,
}

impl IdentityService {
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        verifications: Arc<dyn VerificationRepository>,
        event_bus: Arc<dyn EventBus>,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self {
            agents,
            verifications,
            event_bus,
            config,
            challenges: KeyedTtlStore::new(),
        }
    }

    /// Look up the agent, registering it on first contact.
    pub async fn ensure_agent(&self, agent_id: &AgentId) -> LedgerResult<Agent> {
        Ok(sagacity::ensure_agent(self.agents.as_ref(), self.event_bus.as_ref(), agent_id).await?)
    }

    /// Issue (or re-issue) a bind challenge for a platform. A second
    /// request before verification overwrites the first.
    pub async fn request_binding(
        &self,
        agent_id: &AgentId,
        platform: &str,
    ) -> LedgerResult<BindChallenge> {
        if platform.trim().is_empty() {
            return Err(LedgerError::Validation("platform must not be empty".to_string()));
        }
        self.ensure_agent(agent_id).await?;

        let challenge =
            BindChallenge::issue(agent_id.clone(), platform, self.config.challenge_ttl());
        self.challenges.put(
            challenge_key(agent_id, platform),
            challenge.clone(),
            challenge.expires_at,
        );
        info!(agent = %agent_id, platform, "bind challenge issued");
        Ok(challenge)
    }

    /// Complete a binding by presenting the challenge token and the
    /// external handle it was posted from.
    pub async fn verify_binding(
        &self,
        agent_id: &AgentId,
        platform: &str,
        handle: &str,
        token: &str,
    ) -> LedgerResult<Verification> {
        if handle.trim().is_empty() {
            return Err(LedgerError::Validation("handle must not be empty".to_string()));
        }

        let now = Utc::now();
        let key = challenge_key(agent_id, platform);
        let challenge = self
            .challenges
            .peek(&key, now)
            .ok_or_else(|| LedgerError::Validation("no pending challenge".to_string()))?;
        if challenge.token != token {
            return Err(LedgerError::Unauthorized("challenge token mismatch".to_string()));
        }

        if let Some(existing) = self.verifications.find_binding(platform, handle).await? {
            if existing.agent_id == *agent_id {
                // Already bound to this agent; re-verification is a no-op.
                self.challenges.remove(&key);
                return Ok(existing);
            }
            return Err(LedgerError::Conflict(format!(
                "{platform} handle '{handle}' is already bound to another agent"
            )));
        }

        let verification = Verification {
            platform: platform.to_string(),
            handle: handle.to_string(),
            agent_id: agent_id.clone(),
            verified_at: now,
        };
        self.verifications.save(&verification).await?;
        self.challenges.remove(&key);

        if let Some(mut agent) = self.agents.find_by_id(agent_id).await? {
            agent.record_contribution();
            self.agents.save(&agent).await?;
        }
        info!(agent = %agent_id, platform, handle, "handle bound");
        Ok(verification)
    }

    /// All confirmed bindings for an agent.
    pub async fn bindings(&self, agent_id: &AgentId) -> LedgerResult<Vec<Verification>> {
        Ok(self.verifications.list_for_agent(agent_id).await?)
    }

    /// Drop expired bind challenges. Returns how many were purged.
    pub fn purge_stale_challenges(&self) -> usize {
        self.challenges.purge_expired(Utc::now())
    }
}

fn challenge_key(agent_id: &AgentId, platform: &str) -> String {
    format!("{agent_id}:{platform}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LedgerEvent;
    use crate::infrastructure::{InMemoryAgentRepository, InMemoryVerificationRepository};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockEventBus {
        events: Mutex<Vec<LedgerEvent>>,
    }

    impl MockEventBus {
        fn new() -> Self {
            Self { events: Mutex::new(Vec::new()) }
        }

        fn event_types(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|e| e.event_type()).collect()
        }
    }

    #[async_trait]
    impl EventBus for MockEventBus {
        async fn publish(&self, event: LedgerEvent) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn service() -> (IdentityService, Arc<MockEventBus>) {
        let bus = Arc::new(MockEventBus::new());
        let service = IdentityService::new(
            Arc::new(InMemoryAgentRepository::new()),
            Arc::new(InMemoryVerificationRepository::new()),
            bus.clone(),
            Arc::new(GovernanceConfig::default()),
        );
        (service, bus)
    }

    #[tokio::test]
    async fn test_ensure_agent_registers_once() {
        let (service, bus) = service();
        let agent_id = AgentId::new("agent:aragog");

        let first = service.ensure_agent(&agent_id).await.unwrap();
        let second = service.ensure_agent(&agent_id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(
            bus.event_types().iter().filter(|t| **t == "agent_registered").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_full_binding_flow() {
        let (service, _) = service();
        let agent_id = AgentId::new("agent:aragog");

        let challenge = service.request_binding(&agent_id, "github").await.unwrap();
        let verification = service
            .verify_binding(&agent_id, "github", "aragog-dev", &challenge.token)
            .await
            .unwrap();

        assert_eq!(verification.handle, "aragog-dev");
        assert_eq!(service.bindings(&agent_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_token_rejected() {
        let (service, _) = service();
        let agent_id = AgentId::new("agent:aragog");

        service.request_binding(&agent_id, "github").await.unwrap();
        let err = service
            .verify_binding(&agent_id, "github", "aragog-dev", "not-the-token")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_verify_without_challenge_rejected() {
        let (service, _) = service();
        let err = service
            .verify_binding(&AgentId::new("agent:aragog"), "github", "aragog-dev", "token")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sybil_binding_conflicts() {
        let (service, _) = service();
        let first = AgentId::new("agent:aragog");
        let second = AgentId::new("agent:mosag");

        let challenge = service.request_binding(&first, "github").await.unwrap();
        service
            .verify_binding(&first, "github", "shared-handle", &challenge.token)
            .await
            .unwrap();

        let challenge = service.request_binding(&second, "github").await.unwrap();
        let err = service
            .verify_binding(&second, "github", "shared-handle", &challenge.token)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_rebinding_same_agent_is_idempotent() {
        let (service, _) = service();
        let agent_id = AgentId::new("agent:aragog");

        let challenge = service.request_binding(&agent_id, "github").await.unwrap();
        service
            .verify_binding(&agent_id, "github", "aragog-dev", &challenge.token)
            .await
            .unwrap();

        let challenge = service.request_binding(&agent_id, "github").await.unwrap();
        let verification = service
            .verify_binding(&agent_id, "github", "aragog-dev", &challenge.token)
            .await
            .unwrap();
        assert_eq!(verification.agent_id, agent_id);
        assert_eq!(service.bindings(&agent_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rerequest_overwrites_challenge() {
        let (service, _) = service();
        let agent_id = AgentId::new("agent:aragog");

        let stale = service.request_binding(&agent_id, "github").await.unwrap();
        let fresh = service.request_binding(&agent_id, "github").await.unwrap();
        assert_ne!(stale.token, fresh.token);

        let err = service
            .verify_binding(&agent_id, "github", "aragog-dev", &stale.token)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
        service
            .verify_binding(&agent_id, "github", "aragog-dev", &fresh.token)
            .await
            .unwrap();
    }
}
