// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! In-memory repository implementations.
//!
//! Reference backend for development and testing. Agent insertion order is
//! preserved because tier percentiles break ties by encounter order.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    Agent, AgentId, Article, ArticleStatus, Citation, CitationId, CitationReview, Isomorphism,
    IsomorphismId, IsomorphismStatus, Task, TaskId, Verification, Vote, VoteTarget,
};
use crate::infrastructure::repository::{
    AgentRepository, ArticleRepository, CitationRepository, IsomorphismRepository, TaskRepository,
    VerificationRepository, VoteRepository,
};

#[derive(Default)]
pub struct InMemoryAgentRepository {
    // Vec keeps registration order for percentile tie-breaking.
    agents: Arc<RwLock<Vec<Agent>>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn save(&self, agent: &Agent) -> Result<()> {
        let mut agents = self.agents.write().await;
        match agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent.clone(),
            None => agents.push(agent.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>> {
        let agents = self.agents.read().await;
        Ok(agents.iter().find(|a| &a.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Agent>> {
        let agents = self.agents.read().await;
        Ok(agents.clone())
    }
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: Arc<RwLock<HashMap<String, Article>>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn save(&self, article: &Article) -> Result<()> {
        let mut articles = self.articles.write().await;
        articles.insert(article.slug.clone(), article.clone());
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.get(slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.values().cloned().collect())
    }

    async fn list_by_status(&self, status: ArticleStatus) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.values().filter(|a| a.status == status).cloned().collect())
    }

    async fn find_by_citation(&self, citation_id: CitationId) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        Ok(articles
            .values()
            .filter(|a| a.citation_ids.contains(&citation_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCitationRepository {
    citations: Arc<RwLock<HashMap<CitationId, Citation>>>,
    reviews: Arc<RwLock<HashMap<(AgentId, CitationId), CitationReview>>>,
}

impl InMemoryCitationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CitationRepository for InMemoryCitationRepository {
    async fn save(&self, citation: &Citation) -> Result<()> {
        let mut citations = self.citations.write().await;
        citations.insert(citation.id, citation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CitationId) -> Result<Option<Citation>> {
        let citations = self.citations.read().await;
        Ok(citations.get(&id).cloned())
    }

    async fn save_review(&self, review: &CitationReview) -> Result<()> {
        let mut reviews = self.reviews.write().await;
        reviews.insert((review.agent_id.clone(), review.citation_id), review.clone());
        Ok(())
    }

    async fn reviews_for(&self, citation_id: CitationId) -> Result<Vec<CitationReview>> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .filter(|r| r.citation_id == citation_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryVoteRepository {
    votes: Arc<RwLock<HashMap<(AgentId, VoteTarget), Vote>>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn save(&self, vote: &Vote) -> Result<()> {
        let mut votes = self.votes.write().await;
        votes.insert((vote.agent_id.clone(), vote.target.clone()), vote.clone());
        Ok(())
    }

    async fn find(&self, agent_id: &AgentId, target: &VoteTarget) -> Result<Option<Vote>> {
        let votes = self.votes.read().await;
        Ok(votes.get(&(agent_id.clone(), target.clone())).cloned())
    }

    async fn votes_for(&self, target: &VoteTarget) -> Result<Vec<Vote>> {
        let votes = self.votes.read().await;
        Ok(votes.values().filter(|v| &v.target == target).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryIsomorphismRepository {
    isomorphisms: Arc<RwLock<HashMap<IsomorphismId, Isomorphism>>>,
}

impl InMemoryIsomorphismRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IsomorphismRepository for InMemoryIsomorphismRepository {
    async fn save(&self, isomorphism: &Isomorphism) -> Result<()> {
        let mut isomorphisms = self.isomorphisms.write().await;
        isomorphisms.insert(isomorphism.id, isomorphism.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: IsomorphismId) -> Result<Option<Isomorphism>> {
        let isomorphisms = self.isomorphisms.read().await;
        Ok(isomorphisms.get(&id).cloned())
    }

    async fn list_by_status(&self, status: IsomorphismStatus) -> Result<Vec<Isomorphism>> {
        let isomorphisms = self.isomorphisms.read().await;
        Ok(isomorphisms.values().filter(|i| i.status == status).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Isomorphism>> {
        let isomorphisms = self.isomorphisms.read().await;
        Ok(isomorphisms.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryVerificationRepository {
    bindings: Arc<RwLock<HashMap<(String, String), Verification>>>,
}

impl InMemoryVerificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationRepository for InMemoryVerificationRepository {
    async fn save(&self, verification: &Verification) -> Result<()> {
        let mut bindings = self.bindings.write().await;
        bindings.insert(
            (verification.platform.clone(), verification.handle.clone()),
            verification.clone(),
        );
        Ok(())
    }

    async fn find_binding(&self, platform: &str, handle: &str) -> Result<Option<Verification>> {
        let bindings = self.bindings.read().await;
        Ok(bindings.get(&(platform.to_string(), handle.to_string())).cloned())
    }

    async fn list_for_agent(&self, agent_id: &AgentId) -> Result<Vec<Verification>> {
        let bindings = self.bindings.read().await;
        Ok(bindings.values().filter(|v| &v.agent_id == agent_id).cloned().collect())
    }
}
