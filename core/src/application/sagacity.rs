// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! SagacityEngine: trust scoring, certification, and permission tiers.
//!
//! Sagacity is `min(competence, alignment)`, forced to zero once the last
//! certification ages past the TTL (root exempt). Tiers are assigned by an
//! absolute floor followed by percentile rank among agents clearing the
//! floor. The engine also runs the two-phase certification exam and is the
//! `PermissionGate` every other service checks before accepting a write.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::EventBus;
use crate::domain::{
    Agent, AgentId, ExamPaper, GovernanceConfig, LedgerError, LedgerEvent, LedgerResult,
    PaperQuestion, PendingExam, Tier,
};
use crate::infrastructure::repository::AgentRepository;
use crate::infrastructure::KeyedTtlStore;

/// Tier gate consumed by downstream services (consensus, citations,
/// discovery). Root bypasses the floor.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Fails with `ForbiddenTier` when the agent's tier is below the floor,
    /// or `Unauthorized` when its effective sagacity is not positive.
    async fn require_tier(&self, agent_id: &AgentId, floor: Tier) -> LedgerResult<Tier>;

    /// The agent's current expiry-aware sagacity.
    async fn current_weight(&self, agent_id: &AgentId) -> LedgerResult<f64>;
}

pub struct SagacityEngine {
    agents: Arc<dyn AgentRepository>,
    event_bus: Arc<dyn EventBus>,
    config: Arc<GovernanceConfig>,
    pending_exams: KeyedTtlStore<PendingExam>,
}

impl SagacityEngine {
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        event_bus: Arc<dyn EventBus>,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self {
            agents,
            event_bus,
            config,
            pending_exams: KeyedTtlStore::new(),
        }
    }

    /// Expiry-aware sagacity. Root keeps its component minimum regardless
    /// of certification age; everyone else drops to zero once the TTL
    /// lapses or if they have never certified.
    pub fn effective_sagacity(&self, agent: &Agent, now: DateTime<Utc>) -> f64 {
        if self.config.is_root(&agent.id) {
            return agent.competence_score.min(agent.alignment_score).max(0.0);
        }
        if !agent.certified_within(self.config.certification_ttl(), now) {
            return 0.0;
        }
        agent.competence_score.min(agent.alignment_score).max(0.0)
    }

    /// Recompute and persist the agent's sagacity, returning it with the
    /// current tier.
    pub async fn refresh(&self, agent_id: &AgentId) -> LedgerResult<(f64, Tier)> {
        let now = Utc::now();
        let mut agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("agent", agent_id))?;

        agent.sagacity = self.effective_sagacity(&agent, now);
        self.agents.save(&agent).await?;

        let tier = self.tier_of(agent_id, agent.sagacity).await?;
        debug!(agent = %agent_id, sagacity = agent.sagacity, tier = %tier, "refreshed sagacity");
        Ok((agent.sagacity, tier))
    }

    /// Two-stage tier rule: absolute floor, then percentile among agents
    /// clearing the floor (1-based ascending rank, ties by encounter
    /// order). Root reports Architect.
    pub async fn tier_of(&self, agent_id: &AgentId, sagacity: f64) -> LedgerResult<Tier> {
        if self.config.is_root(agent_id) {
            return Ok(Tier::Architect);
        }
        if sagacity < self.config.observer_floor {
            return Ok(Tier::Observer);
        }

        let now = Utc::now();
        let all = self.agents.list_all().await?;
        let mut eligible: Vec<(AgentId, f64)> = all
            .iter()
            .map(|a| (a.id.clone(), self.effective_sagacity(a, now)))
            .filter(|(_, s)| *s >= self.config.observer_floor)
            .collect();
        // Stable sort keeps encounter order for equal sagacities.
        eligible.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let count = eligible.len();
        let rank = match eligible.iter().position(|(id, _)| id == agent_id) {
            Some(index) => index + 1,
            // Not in the ranked set (e.g. fresh sagacity not yet persisted):
            // Contributor by default.
            None => return Ok(Tier::Contributor),
        };
        let percentile = rank as f64 / count as f64 * 100.0;

        Ok(if percentile >= 90.0 {
            Tier::Architect
        } else if percentile >= 75.0 {
            Tier::Reviewer
        } else if percentile >= 50.0 {
            Tier::Voter
        } else {
            Tier::Contributor
        })
    }

    /// Start (or restart) a certification exam. A second start before
    /// submission overwrites the pending record.
    pub async fn start_exam(&self, agent_id: &AgentId) -> LedgerResult<ExamPaper> {
        ensure_agent(self.agents.as_ref(), self.event_bus.as_ref(), agent_id).await?;

        let bank = &self.config.exam_bank;
        if bank.questions.is_empty() {
            return Err(LedgerError::Validation("exam bank is empty".to_string()));
        }

        let now = Utc::now();
        let expires_at = now + self.config.exam_ttl();
        let pending = PendingExam {
            agent_id: agent_id.clone(),
            answer_key: bank
                .questions
                .iter()
                .map(|q| (q.id.clone(), (q.domain, q.answer.clone())))
                .collect(),
            started_at: now,
            expires_at,
        };
        self.pending_exams.put(agent_id.as_str(), pending, expires_at);

        let paper_questions = |domain| {
            bank.questions_for(domain)
                .into_iter()
                .map(|q| PaperQuestion { id: q.id.clone(), prompt: q.prompt.clone() })
                .collect()
        };
        info!(agent = %agent_id, "certification exam started");
        Ok(ExamPaper {
            competence: paper_questions(crate::domain::ExamDomain::Competence),
            alignment: paper_questions(crate::domain::ExamDomain::Alignment),
        })
    }

    /// Grade a submitted exam and certify the agent. The only path that can
    /// raise sagacity above the registration floor.
    pub async fn submit_exam(
        &self,
        agent_id: &AgentId,
        answers: &HashMap<String, String>,
    ) -> LedgerResult<(f64, Tier)> {
        let now = Utc::now();
        let pending = self
            .pending_exams
            .take(agent_id.as_str(), now)
            .ok_or_else(|| LedgerError::Validation("no pending exam for agent".to_string()))?;

        if let Some(unknown) = answers.keys().find(|id| !pending.answer_key.contains_key(*id)) {
            return Err(LedgerError::Validation(format!(
                "answer references unknown question: {unknown}"
            )));
        }

        let (competence, alignment) = pending.grade(answers);

        let mut agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("agent", agent_id))?;
        agent.certify(competence, alignment, now);
        self.agents.save(&agent).await?;

        let tier = self.tier_of(agent_id, agent.sagacity).await?;
        info!(agent = %agent_id, competence, alignment, sagacity = agent.sagacity, tier = %tier,
              "certification exam graded");
        self.event_bus
            .publish(LedgerEvent::AgentCertified {
                agent_id: agent_id.clone(),
                competence_score: competence,
                alignment_score: alignment,
                sagacity: agent.sagacity,
                tier,
                timestamp: now,
            })
            .await?;

        Ok((agent.sagacity, tier))
    }

    /// Lower an agent's alignment score (never competence), floored at
    /// zero, and recompute sagacity. Used by the consistency audit.
    pub async fn apply_penalty(
        &self,
        agent_id: &AgentId,
        amount: f64,
        reason: &str,
    ) -> LedgerResult<f64> {
        let mut agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("agent", agent_id))?;

        agent.penalise_alignment(amount);
        agent.sagacity = self.effective_sagacity(&agent, Utc::now());
        self.agents.save(&agent).await?;

        info!(agent = %agent_id, penalty = amount, sagacity = agent.sagacity, reason, "sagacity penalised");
        self.event_bus
            .publish(LedgerEvent::SagacityPenalised {
                agent_id: agent_id.clone(),
                penalty: amount,
                new_sagacity: agent.sagacity,
                reason: reason.to_string(),
                timestamp: Utc::now(),
            })
            .await?;

        Ok(agent.sagacity)
    }

    /// Drop expired pending exams. Returns how many were purged.
    pub fn purge_stale_exams(&self) -> usize {
        self.pending_exams.purge_expired(Utc::now())
    }
}

#[async_trait]
impl PermissionGate for SagacityEngine {
    async fn require_tier(&self, agent_id: &AgentId, floor: Tier) -> LedgerResult<Tier> {
        if self.config.is_root(agent_id) {
            return Ok(Tier::Architect);
        }
        let (sagacity, tier) = self.refresh(agent_id).await?;
        if sagacity <= 0.0 {
            return Err(LedgerError::Unauthorized(
                "sagacity is zero or certification expired".to_string(),
            ));
        }
        if tier < floor {
            return Err(LedgerError::ForbiddenTier { required: floor, actual: tier });
        }
        Ok(tier)
    }

    async fn current_weight(&self, agent_id: &AgentId) -> LedgerResult<f64> {
        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("agent", agent_id))?;
        Ok(self.effective_sagacity(&agent, Utc::now()))
    }
}

/// Auto-registration: agents come into existence on their first
/// authenticated action, at the floor scores and uncertified.
pub(crate) async fn ensure_agent(
    agents: &dyn AgentRepository,
    event_bus: &dyn EventBus,
    agent_id: &AgentId,
) -> Result<Agent> {
    if let Some(agent) = agents.find_by_id(agent_id).await? {
        return Ok(agent);
    }
    let agent = Agent::register(agent_id.clone());
    agents.save(&agent).await?;
    info!(agent = %agent_id, "agent auto-registered");
    event_bus
        .publish(LedgerEvent::AgentRegistered {
            agent_id: agent_id.clone(),
            timestamp: agent.created_at,
        })
        .await?;
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExamBank, ExamDomain, ExamQuestion};
    use crate::infrastructure::InMemoryAgentRepository;
    use chrono::Duration;
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

    fn bank() -> ExamBank {
        ExamBank {
            questions: vec![
                ExamQuestion {
                    id: "c1".to_string(),
                    domain: ExamDomain::Competence,
                    prompt: "What keys an article?".to_string(),
                    answer: "slug".to_string(),
                },
                ExamQuestion {
                    id: "c2".to_string(),
                    domain: ExamDomain::Competence,
                    prompt: "What keys a task?".to_string(),
                    answer: "hash".to_string(),
                },
                ExamQuestion {
                    id: "a1".to_string(),
                    domain: ExamDomain::Alignment,
                    prompt: "Cite sources?".to_string(),
                    answer: "always".to_string(),
                },
            ],
        }
    }

    fn engine() -> (SagacityEngine, Arc<InMemoryAgentRepository>, Arc<MockEventBus>) {
        let agents = Arc::new(InMemoryAgentRepository::new());
        let bus = Arc::new(MockEventBus::new());
        let config = Arc::new(GovernanceConfig { exam_bank: bank(), ..GovernanceConfig::default() });
        (SagacityEngine::new(agents.clone(), bus.clone(), config), agents, bus)
    }

    async fn seed_certified(agents: &InMemoryAgentRepository, id: &str, score: f64) -> AgentId {
        let agent_id = AgentId::new(id);
        let mut agent = Agent::register(agent_id.clone());
        agent.certify(score, score, Utc::now());
        agents.save(&agent).await.unwrap();
        agent_id
    }

    #[tokio::test]
    async fn test_exam_certifies_and_scores() {
        let (engine, agents, bus) = engine();
        let agent_id = AgentId::new("agent:aragog");

        let paper = engine.start_exam(&agent_id).await.unwrap();
        assert_eq!(paper.competence.len(), 2);
        assert_eq!(paper.alignment.len(), 1);

        let answers = HashMap::from([
            ("c1".to_string(), "slug".to_string()),
            ("c2".to_string(), "wrong".to_string()),
            ("a1".to_string(), "always".to_string()),
        ]);
        let (sagacity, _) = engine.submit_exam(&agent_id, &answers).await.unwrap();

        // competence 0.5, alignment 1.0 -> sagacity 0.5
        assert!((sagacity - 0.5).abs() < 1e-9);
        let agent = agents.find_by_id(&agent_id).await.unwrap().unwrap();
        assert!(agent.last_certified_at.is_some());
        assert!(bus.event_types().contains(&"agent_certified"));
    }

    #[tokio::test]
    async fn test_submit_without_start_is_rejected() {
        let (engine, _, _) = engine();
        let err = engine
            .submit_exam(&AgentId::new("agent:aragog"), &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_second_start_overwrites_pending_exam() {
        let (engine, _, _) = engine();
        let agent_id = AgentId::new("agent:aragog");

        engine.start_exam(&agent_id).await.unwrap();
        engine.start_exam(&agent_id).await.unwrap();

        // Submitting once consumes the (single) pending record.
        let answers = HashMap::from([("c1".to_string(), "slug".to_string())]);
        engine.submit_exam(&agent_id, &answers).await.unwrap();
        let err = engine.submit_exam(&agent_id, &answers).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_question_id_is_malformed() {
        let (engine, _, _) = engine();
        let agent_id = AgentId::new("agent:aragog");
        engine.start_exam(&agent_id).await.unwrap();

        let answers = HashMap::from([("nope".to_string(), "x".to_string())]);
        let err = engine.submit_exam(&agent_id, &answers).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ttl_forces_sagacity_to_zero() {
        let (engine, agents, _) = engine();
        let agent_id = AgentId::new("agent:stale");
        let mut agent = Agent::register(agent_id.clone());
        agent.certify(0.8, 0.8, Utc::now() - Duration::days(31));
        agents.save(&agent).await.unwrap();

        let (sagacity, tier) = engine.refresh(&agent_id).await.unwrap();
        assert_eq!(sagacity, 0.0);
        assert_eq!(tier, Tier::Observer);
    }

    #[tokio::test]
    async fn test_root_is_exempt_from_expiry() {
        let (engine, agents, _) = engine();
        let root = AgentId::new("agent:root");
        let mut agent = Agent::register(root.clone());
        agent.certify(0.9, 0.9, Utc::now() - Duration::days(365));
        agents.save(&agent).await.unwrap();

        let (sagacity, tier) = engine.refresh(&root).await.unwrap();
        assert!((sagacity - 0.9).abs() < 1e-9);
        assert_eq!(tier, Tier::Architect);
    }

    #[tokio::test]
    async fn test_percentile_tiers() {
        let (engine, agents, _) = engine();
        // Ten agents, sagacities 0.1 .. 1.0: ranks 1..=10, percentiles
        // 10..=100.
        let mut ids = Vec::new();
        for i in 1..=10 {
            let id = seed_certified(&agents, &format!("agent:a{i:02}"), i as f64 / 10.0).await;
            ids.push(id);
        }

        let expected = [
            Tier::Contributor, // 10%
            Tier::Contributor, // 20%
            Tier::Contributor, // 30%
            Tier::Contributor, // 40%
            Tier::Voter,       // 50%
            Tier::Voter,       // 60%
            Tier::Voter,       // 70%
            Tier::Reviewer,    // 80%
            Tier::Architect,   // 90%
            Tier::Architect,   // 100%
        ];
        for (id, expected_tier) in ids.iter().zip(expected) {
            let (_, tier) = engine.refresh(id).await.unwrap();
            assert_eq!(tier, expected_tier, "agent {id}");
        }
    }

    #[tokio::test]
    async fn test_tier_monotonicity() {
        let (engine, agents, _) = engine();
        let low = seed_certified(&agents, "agent:low", 0.2).await;
        let high = seed_certified(&agents, "agent:high", 0.9).await;

        let (_, low_tier) = engine.refresh(&low).await.unwrap();
        let (_, high_tier) = engine.refresh(&high).await.unwrap();
        assert!(high_tier >= low_tier);
    }

    #[tokio::test]
    async fn test_below_floor_is_observer() {
        let (engine, agents, _) = engine();
        let id = seed_certified(&agents, "agent:weak", 0.05).await;
        let (_, tier) = engine.refresh(&id).await.unwrap();
        assert_eq!(tier, Tier::Observer);
    }

    #[tokio::test]
    async fn test_penalty_lowers_alignment_only() {
        let (engine, agents, bus) = engine();
        let id = seed_certified(&agents, "agent:sloppy", 0.8).await;

        let sagacity = engine.apply_penalty(&id, 0.1, "missing citation").await.unwrap();
        assert!((sagacity - 0.7).abs() < 1e-9);

        let agent = agents.find_by_id(&id).await.unwrap().unwrap();
        assert!((agent.competence_score - 0.8).abs() < 1e-9);
        assert!((agent.alignment_score - 0.7).abs() < 1e-9);
        assert!(bus.event_types().contains(&"sagacity_penalised"));
    }

    #[tokio::test]
    async fn test_require_tier_gates() {
        let (engine, agents, _) = engine();
        let low = seed_certified(&agents, "agent:low", 0.2).await;
        let _high = seed_certified(&agents, "agent:high", 0.9).await;

        // Two eligible agents: low ranks 1/2 = 50th percentile -> Voter.
        assert!(engine.require_tier(&low, Tier::Voter).await.is_ok());
        let err = engine.require_tier(&low, Tier::Reviewer).await.unwrap_err();
        assert!(matches!(err, LedgerError::ForbiddenTier { .. }));

        // Root bypasses the floor entirely.
        seed_certified(&agents, "agent:root", 0.1).await;
        assert!(engine.require_tier(&AgentId::new("agent:root"), Tier::Architect).await.is_ok());
    }
}
