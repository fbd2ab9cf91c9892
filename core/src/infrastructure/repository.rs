// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository interfaces for the governance ledger.
//!
//! One repository per aggregate root, interface defined here, implemented
//! in `crate::infrastructure::memory` for development and testing. A
//! production deployment can supply relational implementations behind the
//! same traits; the ledger only requires primary-key and foreign-key
//! lookups plus exclusive per-target locking (see `locks`).

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{
    Agent, AgentId, Article, ArticleStatus, Citation, CitationId, CitationReview, Isomorphism,
    IsomorphismId, IsomorphismStatus, Task, TaskId, Verification, Vote, VoteTarget,
};

#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Save an agent (create or update).
    async fn save(&self, agent: &Agent) -> Result<()>;

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>>;

    /// All agents, in registration (encounter) order. Percentile ranking
    /// depends on this order being stable for tie-breaking.
    async fn list_all(&self) -> Result<Vec<Agent>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn save(&self, task: &Task) -> Result<()>;

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>>;

    async fn list_all(&self) -> Result<Vec<Task>>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn save(&self, article: &Article) -> Result<()>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    async fn list_all(&self) -> Result<Vec<Article>>;

    async fn list_by_status(&self, status: ArticleStatus) -> Result<Vec<Article>>;

    /// Articles that link the given citation.
    async fn find_by_citation(&self, citation_id: CitationId) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait CitationRepository: Send + Sync {
    async fn save(&self, citation: &Citation) -> Result<()>;

    async fn find_by_id(&self, id: CitationId) -> Result<Option<Citation>>;

    /// Upsert a review keyed by (agent, citation).
    async fn save_review(&self, review: &CitationReview) -> Result<()>;

    async fn reviews_for(&self, citation_id: CitationId) -> Result<Vec<CitationReview>>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Upsert a vote keyed by (agent, target).
    async fn save(&self, vote: &Vote) -> Result<()>;

    async fn find(&self, agent_id: &AgentId, target: &VoteTarget) -> Result<Option<Vote>>;

    /// All votes of record for a target.
    async fn votes_for(&self, target: &VoteTarget) -> Result<Vec<Vote>>;
}

#[async_trait]
pub trait IsomorphismRepository: Send + Sync {
    async fn save(&self, isomorphism: &Isomorphism) -> Result<()>;

    async fn find_by_id(&self, id: IsomorphismId) -> Result<Option<Isomorphism>>;

    async fn list_by_status(&self, status: IsomorphismStatus) -> Result<Vec<Isomorphism>>;

    async fn list_all(&self) -> Result<Vec<Isomorphism>>;
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn save(&self, verification: &Verification) -> Result<()>;

    async fn find_binding(&self, platform: &str, handle: &str) -> Result<Option<Verification>>;

    async fn list_for_agent(&self, agent_id: &AgentId) -> Result<Vec<Verification>>;
}
