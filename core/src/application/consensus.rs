// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! ConsensusLedger: idempotent weighted voting and threshold-gated status
//! transitions.
//!
//! The load-bearing property is live reweighting: a target's total weight
//! is the sum of each voter-of-record's *current* sagacity at recompute
//! time, never the sum of stored vote weights. An agent whose certification
//! expires loses its influence on past votes without acting again.
//!
//! Transitions are one-directional: once a target activates, later weight
//! decay never demotes it.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::{EventBus, PermissionGate, SagacityEngine};
use crate::domain::{
    AgentId, ArticleStatus, IsomorphismId, IsomorphismStatus, GovernanceConfig, LedgerError,
    LedgerResult, LedgerEvent, TaskStatus, Tier, Vote, VoteTarget,
};
use crate::infrastructure::repository::{
    AgentRepository, ArticleRepository, IsomorphismRepository, TaskRepository, VoteRepository,
};
use crate::infrastructure::TargetLockRegistry;

/// Post-vote status of the target, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Task(TaskStatus),
    Article(ArticleStatus),
}

/// What a caller gets back from a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteReceipt {
    /// The caster's sagacity at cast time.
    pub weight: f64,
    /// Live-recomputed total for the target.
    pub total_weight: f64,
    pub status: TargetStatus,
}

pub struct ConsensusLedger {
    agents: Arc<dyn AgentRepository>,
    tasks: Arc<dyn TaskRepository>,
    articles: Arc<dyn ArticleRepository>,
    isomorphisms: Arc<dyn IsomorphismRepository>,
    votes: Arc<dyn VoteRepository>,
    sagacity: Arc<SagacityEngine>,
    locks: Arc<TargetLockRegistry>,
    event_bus: Arc<dyn EventBus>,
    config: Arc<GovernanceConfig>,
}

impl ConsensusLedger {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        tasks: Arc<dyn TaskRepository>,
        articles: Arc<dyn ArticleRepository>,
        isomorphisms: Arc<dyn IsomorphismRepository>,
        votes: Arc<dyn VoteRepository>,
        sagacity: Arc<SagacityEngine>,
        locks: Arc<TargetLockRegistry>,
        event_bus: Arc<dyn EventBus>,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self {
            agents,
            tasks,
            articles,
            isomorphisms,
            votes,
            sagacity,
            locks,
            event_bus,
            config,
        }
    }

    /// Cast (or re-cast) a governance vote. One vote per (agent, target):
    /// repeated casts overwrite the weight and timestamp.
    pub async fn cast_vote(
        &self,
        agent_id: &AgentId,
        target: VoteTarget,
    ) -> LedgerResult<VoteReceipt> {
        self.sagacity.require_tier(agent_id, Tier::Voter).await?;
        let weight = self.sagacity.current_weight(agent_id).await?;
        if weight <= 0.0 {
            return Err(LedgerError::Unauthorized(
                "sagacity is zero or certification expired".to_string(),
            ));
        }

        // Exclusive scope over the target across vote-write + recompute,
        // released on every exit path.
        let _guard = self.locks.acquire(&target.to_string()).await;

        self.assert_target_exists(&target).await?;

        let now = Utc::now();
        self.votes
            .save(&Vote {
                agent_id: agent_id.clone(),
                target: target.clone(),
                weight,
                timestamp: now,
            })
            .await?;

        let (total_weight, status) = self.recompute_locked(&target).await?;

        if let Some(mut agent) = self.agents.find_by_id(agent_id).await? {
            agent.record_contribution();
            self.agents.save(&agent).await?;
        }

        info!(agent = %agent_id, target = %target, weight, total_weight, "vote cast");
        self.event_bus
            .publish(LedgerEvent::VoteCast {
                agent_id: agent_id.clone(),
                target,
                weight,
                total_weight,
                timestamp: now,
            })
            .await?;

        Ok(VoteReceipt { weight, total_weight, status })
    }

    /// Recompute a target's total weight from its voters' current
    /// sagacities and apply any pending one-way transition.
    pub async fn recompute(&self, target: &VoteTarget) -> LedgerResult<(f64, TargetStatus)> {
        let _guard = self.locks.acquire(&target.to_string()).await;
        self.recompute_locked(target).await
    }

    async fn assert_target_exists(&self, target: &VoteTarget) -> LedgerResult<()> {
        match target {
            VoteTarget::Task(id) => {
                self.tasks
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("task", id))?;
            }
            VoteTarget::Article(slug) => {
                self.articles
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("article", slug))?;
            }
        }
        Ok(())
    }

    /// Caller must hold the target lock.
    async fn recompute_locked(&self, target: &VoteTarget) -> LedgerResult<(f64, TargetStatus)> {
        let votes = self.votes.votes_for(target).await?;
        let voter_count = votes.len();

        let mut total_weight = 0.0;
        for vote in &votes {
            if let Some(voter) = self.agents.find_by_id(&vote.agent_id).await? {
                total_weight += self.sagacity.effective_sagacity(&voter, Utc::now());
            }
        }
        debug!(target = %target, total_weight, voter_count, "recomputed consensus weight");

        let status = match target {
            VoteTarget::Task(id) => {
                let mut task = self
                    .tasks
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("task", id))?;
                task.total_weight = total_weight;
                if task.status == TaskStatus::Proposed
                    && total_weight >= self.config.task_activation_threshold
                {
                    task.status = TaskStatus::Active;
                    info!(task = %id, total_weight, "task activated by consensus");
                    self.event_bus
                        .publish(LedgerEvent::TaskActivated {
                            task_id: id.clone(),
                            total_weight,
                            timestamp: Utc::now(),
                        })
                        .await?;
                }
                self.tasks.save(&task).await?;
                TargetStatus::Task(task.status)
            }
            VoteTarget::Article(slug) => {
                let mut article = self
                    .articles
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("article", slug))?;
                article.total_weight = total_weight;
                if article.status == ArticleStatus::NeedsReview
                    && total_weight >= self.config.article_activation_threshold
                    && voter_count >= self.config.article_min_voters
                {
                    article.status = ArticleStatus::Active;
                    article.touch();
                    info!(article = %slug, total_weight, voter_count, "article activated by consensus");
                    self.event_bus
                        .publish(LedgerEvent::ArticleActivated {
                            slug: slug.clone(),
                            total_weight,
                            voter_count,
                            timestamp: Utc::now(),
                        })
                        .await?;
                }
                self.articles.save(&article).await?;
                TargetStatus::Article(article.status)
            }
        };

        Ok((total_weight, status))
    }

    /// Endorse an isomorphism proposal. Endorsements are deduplicated per
    /// agent and reweighted live like votes; crossing the threshold with
    /// enough distinct endorsers promotes the proposal to Verified.
    pub async fn endorse_isomorphism(
        &self,
        agent_id: &AgentId,
        iso_id: IsomorphismId,
    ) -> LedgerResult<(f64, IsomorphismStatus)> {
        self.sagacity.require_tier(agent_id, Tier::Voter).await?;
        let weight = self.sagacity.current_weight(agent_id).await?;
        if weight <= 0.0 {
            return Err(LedgerError::Unauthorized(
                "sagacity is zero or certification expired".to_string(),
            ));
        }

        let _guard = self.locks.acquire(&format!("isomorphism:{iso_id}")).await;

        let mut iso = self
            .isomorphisms
            .find_by_id(iso_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("isomorphism", iso_id))?;

        iso.add_endorser(agent_id.clone());

        let mut total_weight = 0.0;
        for endorser in &iso.endorsers {
            if let Some(agent) = self.agents.find_by_id(endorser).await? {
                total_weight += self.sagacity.effective_sagacity(&agent, Utc::now());
            }
        }
        iso.total_weight = total_weight;

        if iso.status == IsomorphismStatus::Proposed
            && total_weight >= self.config.isomorphism_verification_threshold
            && iso.endorsers.len() >= self.config.isomorphism_min_endorsers
        {
            iso.status = IsomorphismStatus::Verified;
            info!(isomorphism = %iso_id, total_weight, "isomorphism verified by consensus");
            self.event_bus
                .publish(LedgerEvent::IsomorphismVerified {
                    isomorphism_id: iso_id,
                    total_weight,
                    endorser_count: iso.endorsers.len(),
                    timestamp: Utc::now(),
                })
                .await?;
        }

        let status = iso.status;
        self.isomorphisms.save(&iso).await?;

        self.event_bus
            .publish(LedgerEvent::IsomorphismEndorsed {
                isomorphism_id: iso_id,
                agent_id: agent_id.clone(),
                total_weight,
                timestamp: Utc::now(),
            })
            .await?;

        Ok((total_weight, status))
    }

    /// Flag an isomorphism as disputed. Reviewer floor: disputing is a
    /// stronger claim than endorsing.
    pub async fn dispute_isomorphism(
        &self,
        agent_id: &AgentId,
        iso_id: IsomorphismId,
    ) -> LedgerResult<IsomorphismStatus> {
        self.sagacity.require_tier(agent_id, Tier::Reviewer).await?;

        let _guard = self.locks.acquire(&format!("isomorphism:{iso_id}")).await;

        let mut iso = self
            .isomorphisms
            .find_by_id(iso_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("isomorphism", iso_id))?;
        iso.status = IsomorphismStatus::Disputed;
        self.isomorphisms.save(&iso).await?;
        info!(isomorphism = %iso_id, agent = %agent_id, "isomorphism disputed");
        Ok(iso.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Agent, Article, Isomorphism, Task, TaskPriority};
    use crate::infrastructure::{
        InMemoryAgentRepository, InMemoryArticleRepository, InMemoryIsomorphismRepository,
        InMemoryTaskRepository, InMemoryVoteRepository,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::BTreeMap;
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

    struct Fixture {
        ledger: ConsensusLedger,
        agents: Arc<InMemoryAgentRepository>,
        tasks: Arc<InMemoryTaskRepository>,
        articles: Arc<InMemoryArticleRepository>,
        isomorphisms: Arc<InMemoryIsomorphismRepository>,
        bus: Arc<MockEventBus>,
    }

    fn fixture() -> Fixture {
        let agents = Arc::new(InMemoryAgentRepository::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let articles = Arc::new(InMemoryArticleRepository::new());
        let isomorphisms = Arc::new(InMemoryIsomorphismRepository::new());
        let votes = Arc::new(InMemoryVoteRepository::new());
        let bus = Arc::new(MockEventBus::new());
        let config = Arc::new(GovernanceConfig::default());
        let sagacity = Arc::new(SagacityEngine::new(agents.clone(), bus.clone(), config.clone()));
        let ledger = ConsensusLedger::new(
            agents.clone(),
            tasks.clone(),
            articles.clone(),
            isomorphisms.clone(),
            votes,
            sagacity,
            Arc::new(TargetLockRegistry::new()),
            bus.clone(),
            config,
        );
        Fixture { ledger, agents, tasks, articles, isomorphisms, bus }
    }

    async fn seed_voter(fixture: &Fixture, id: &str, sagacity: f64) -> AgentId {
        seed_voter_at(fixture, id, sagacity, Utc::now()).await
    }

    async fn seed_voter_at(
        fixture: &Fixture,
        id: &str,
        sagacity: f64,
        certified_at: chrono::DateTime<Utc>,
    ) -> AgentId {
        let agent_id = AgentId::new(id);
        let mut agent = Agent::register(agent_id.clone());
        agent.certify(sagacity, sagacity, certified_at);
        fixture.agents.save(&agent).await.unwrap();
        agent_id
    }

    async fn seed_task(fixture: &Fixture, description: &str) -> VoteTarget {
        let task = Task::propose(description, TaskPriority::Medium, None);
        let id = task.id.clone();
        fixture.tasks.save(&task).await.unwrap();
        VoteTarget::Task(id)
    }

    async fn seed_article(fixture: &Fixture, slug: &str) -> VoteTarget {
        let mut article = Article::draft(slug, slug);
        article.status = ArticleStatus::NeedsReview;
        fixture.articles.save(&article).await.unwrap();
        VoteTarget::Article(slug.to_string())
    }

    #[tokio::test]
    async fn test_three_voters_activate_task() {
        let fixture = fixture();
        // The pad agent anchors the bottom of the percentile ranking so all
        // three 0.2 voters clear the 50th percentile.
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.2).await;
        let b = seed_voter(&fixture, "agent:b", 0.2).await;
        let c = seed_voter(&fixture, "agent:c", 0.2).await;
        let target = seed_task(&fixture, "curate the fungi cluster").await;

        fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();
        fixture.ledger.cast_vote(&b, target.clone()).await.unwrap();
        let receipt = fixture.ledger.cast_vote(&c, target.clone()).await.unwrap();

        assert!((receipt.total_weight - 0.6).abs() < 1e-9);
        assert_eq!(receipt.status, TargetStatus::Task(TaskStatus::Active));
        assert!(fixture.bus.event_types().contains(&"task_activated"));
    }

    #[tokio::test]
    async fn test_revote_is_idempotent() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.3).await;
        let target = seed_task(&fixture, "re-vote target").await;

        let first = fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();
        let second = fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();

        // Same single vote of record: total unchanged, no double counting.
        assert!((first.total_weight - 0.3).abs() < 1e-9);
        assert!((second.total_weight - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_article_needs_weight_and_two_voters() {
        assert_eq!(article_pair_outcome(0.8, 0.15).await, ArticleStatus::NeedsReview);
        assert_eq!(article_pair_outcome(0.6, 0.6).await, ArticleStatus::Active);
    }

    async fn article_pair_outcome(first: f64, second: f64) -> ArticleStatus {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", first).await;
        let b = seed_voter(&fixture, "agent:b", second).await;
        let target = seed_article(&fixture, "candidate").await;

        fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();
        let receipt = fixture.ledger.cast_vote(&b, target.clone()).await.unwrap();
        match receipt.status {
            TargetStatus::Article(status) => status,
            TargetStatus::Task(_) => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_single_heavy_voter_cannot_activate_article() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let heavy = seed_voter(&fixture, "agent:heavy", 1.0).await;
        let target = seed_article(&fixture, "solo").await;

        let receipt = fixture.ledger.cast_vote(&heavy, target).await.unwrap();
        assert!(receipt.total_weight >= 1.0);
        assert_eq!(receipt.status, TargetStatus::Article(ArticleStatus::NeedsReview));
    }

    #[tokio::test]
    async fn test_live_reweighting_drops_expired_voters() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.3).await;
        let b = seed_voter(&fixture, "agent:b", 0.3).await;
        let target = seed_task(&fixture, "live reweight target").await;

        fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();
        let receipt = fixture.ledger.cast_vote(&b, target.clone()).await.unwrap();
        assert!((receipt.total_weight - 0.6).abs() < 1e-9);

        // Expire a's certification. The stored vote row still carries 0.3,
        // but recompute must ignore it.
        let mut stale = fixture.agents.find_by_id(&a).await.unwrap().unwrap();
        stale.certify(0.3, 0.3, Utc::now() - Duration::days(31));
        fixture.agents.save(&stale).await.unwrap();

        let (total, _) = fixture.ledger.recompute(&target).await.unwrap();
        assert!((total - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_activation_is_one_way() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.3).await;
        let b = seed_voter(&fixture, "agent:b", 0.3).await;
        let target = seed_task(&fixture, "ratchet target").await;

        fixture.ledger.cast_vote(&a, target.clone()).await.unwrap();
        fixture.ledger.cast_vote(&b, target.clone()).await.unwrap();

        // Both certifications expire; weight decays below threshold, but
        // the task stays active.
        for id in [&a, &b] {
            let mut agent = fixture.agents.find_by_id(id).await.unwrap().unwrap();
            agent.certify(0.3, 0.3, Utc::now() - Duration::days(31));
            fixture.agents.save(&agent).await.unwrap();
        }

        let (total, status) = fixture.ledger.recompute(&target).await.unwrap();
        assert!(total < 0.5);
        assert_eq!(status, TargetStatus::Task(TaskStatus::Active));
    }

    #[tokio::test]
    async fn test_observer_cannot_vote() {
        let fixture = fixture();
        let observer = seed_voter(&fixture, "agent:observer", 0.05).await;
        let target = seed_task(&fixture, "gated target").await;

        let err = fixture.ledger.cast_vote(&observer, target).await.unwrap_err();
        assert!(matches!(err, LedgerError::ForbiddenTier { .. }));
    }

    #[tokio::test]
    async fn test_expired_agent_cannot_vote() {
        let fixture = fixture();
        let stale =
            seed_voter_at(&fixture, "agent:stale", 0.8, Utc::now() - Duration::days(31)).await;
        let target = seed_task(&fixture, "expired-voter target").await;

        let err = fixture.ledger.cast_vote(&stale, target).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_) | LedgerError::ForbiddenTier { .. }));
    }

    #[tokio::test]
    async fn test_vote_on_missing_target() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.9).await;

        let err = fixture
            .ledger
            .cast_vote(&a, VoteTarget::Article("missing".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_endorsements_verify_isomorphism() {
        let fixture = fixture();
        seed_voter(&fixture, "agent:pad", 0.1).await;
        let a = seed_voter(&fixture, "agent:a", 0.6).await;
        let b = seed_voter(&fixture, "agent:b", 0.6).await;

        let iso = Isomorphism::propose("mycelial-network", "p2p-network", BTreeMap::new(), 0.8, None);
        let iso_id = iso.id;
        fixture.isomorphisms.save(&iso).await.unwrap();

        let (total, status) = fixture.ledger.endorse_isomorphism(&a, iso_id).await.unwrap();
        assert_eq!(status, IsomorphismStatus::Proposed);
        assert!((total - 0.6).abs() < 1e-9);

        let (total, status) = fixture.ledger.endorse_isomorphism(&b, iso_id).await.unwrap();
        assert!((total - 1.2).abs() < 1e-9);
        assert_eq!(status, IsomorphismStatus::Verified);
        assert!(fixture.bus.event_types().contains(&"isomorphism_verified"));

        // Re-endorsing does not double-count.
        let (total, _) = fixture.ledger.endorse_isomorphism(&b, iso_id).await.unwrap();
        assert!((total - 1.2).abs() < 1e-9);
    }
}
