// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! ConsistencyAuditor: scans article content for `[cit:<id>]` tags and
//! penalises authors whose citations do not hold up.
//!
//! Two violation classes, in increasing severity: a cited id the article
//! never linked (the author name-dropped a citation), and a cited id with
//! no global citation record at all (the citation is fabricated or was
//! deleted). Penalties hit alignment only, through the sagacity engine.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::SagacityEngine;
use crate::domain::{AgentId, CitationId, GovernanceConfig, LedgerResult};
use crate::infrastructure::repository::{ArticleRepository, CitationRepository};

static CITATION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[cit:([^\]]+)\]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The tag's id is not among the article's linked citations.
    MissingLink,
    /// No citation record exists anywhere for the tag's id.
    MissingRecord,
}

#[derive(Debug, Clone)]
pub struct AuditViolation {
    pub slug: String,
    pub author_id: Option<AgentId>,
    pub tag: String,
    pub kind: ViolationKind,
    pub penalty: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub articles_scanned: usize,
    pub violations: Vec<AuditViolation>,
    /// Total alignment penalty applied per author.
    pub penalties: HashMap<AgentId, f64>,
}

pub struct ConsistencyAuditor {
    articles: Arc<dyn ArticleRepository>,
    citations: Arc<dyn CitationRepository>,
    sagacity: Arc<SagacityEngine>,
    config: Arc<GovernanceConfig>,
}

impl ConsistencyAuditor {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        citations: Arc<dyn CitationRepository>,
        sagacity: Arc<SagacityEngine>,
        config: Arc<GovernanceConfig>,
    ) -> Self {
        Self { articles, citations, sagacity, config }
    }

    /// Audit every article and apply the accumulated penalties.
    pub async fn run(&self) -> LedgerResult<AuditReport> {
        let mut report = AuditReport::default();

        for article in self.articles.list_all().await? {
            report.articles_scanned += 1;
            for capture in CITATION_TAG.captures_iter(&article.content) {
                let tag = capture[1].to_string();
                let kind = self.classify(&article.citation_ids, &tag).await?;
                let Some(kind) = kind else { continue };

                let penalty = match kind {
                    ViolationKind::MissingLink => self.config.missing_link_penalty,
                    ViolationKind::MissingRecord => self.config.missing_record_penalty,
                };
                warn!(article = %article.slug, tag, ?kind, penalty, "citation audit violation");
                if let Some(author) = &article.author_id {
                    *report.penalties.entry(author.clone()).or_insert(0.0) += penalty;
                }
                report.violations.push(AuditViolation {
                    slug: article.slug.clone(),
                    author_id: article.author_id.clone(),
                    tag,
                    kind,
                    penalty,
                });
            }
        }

        for (author, penalty) in &report.penalties {
            self.sagacity
                .apply_penalty(author, *penalty, "citation consistency audit")
                .await?;
        }

        info!(
            articles = report.articles_scanned,
            violations = report.violations.len(),
            authors_penalised = report.penalties.len(),
            "consistency audit complete"
        );
        Ok(report)
    }

    async fn classify(
        &self,
        linked: &[CitationId],
        tag: &str,
    ) -> LedgerResult<Option<ViolationKind>> {
        // A malformed id can never have a record.
        let Ok(uuid) = Uuid::from_str(tag) else {
            return Ok(Some(ViolationKind::MissingRecord));
        };
        let id = CitationId(uuid);
        if self.citations.find_by_id(id).await?.is_none() {
            return Ok(Some(ViolationKind::MissingRecord));
        }
        if !linked.contains(&id) {
            return Ok(Some(ViolationKind::MissingLink));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::EventBus;
    use crate::domain::{Agent, Article, Citation, LedgerEvent};
    use crate::infrastructure::{
        AgentRepository, InMemoryAgentRepository, InMemoryArticleRepository,
        InMemoryCitationRepository,
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Utc;

    struct NullEventBus;

    #[async_trait]
    impl EventBus for NullEventBus {
        async fn publish(&self, _event: LedgerEvent) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        auditor: ConsistencyAuditor,
        agents: Arc<InMemoryAgentRepository>,
        articles: Arc<InMemoryArticleRepository>,
        citations: Arc<InMemoryCitationRepository>,
    }

    fn fixture() -> Fixture {
        let agents = Arc::new(InMemoryAgentRepository::new());
        let articles = Arc::new(InMemoryArticleRepository::new());
        let citations = Arc::new(InMemoryCitationRepository::new());
        let config = Arc::new(GovernanceConfig::default());
        let sagacity =
            Arc::new(SagacityEngine::new(agents.clone(), Arc::new(NullEventBus), config.clone()));
        let auditor =
            ConsistencyAuditor::new(articles.clone(), citations.clone(), sagacity, config);
        Fixture { auditor, agents, articles, citations }
    }

    async fn seed_author(fixture: &Fixture, id: &str) -> AgentId {
        let agent_id = AgentId::new(id);
        let mut agent = Agent::register(agent_id.clone());
        agent.certify(0.8, 0.8, Utc::now());
        fixture.agents.save(&agent).await.unwrap();
        agent_id
    }

    #[tokio::test]
    async fn test_clean_article_passes() {
        let fixture = fixture();
        let author = seed_author(&fixture, "agent:a").await;

        let citation = Citation::new("https://example.org", "Paper");
        let id = citation.id;
        fixture.citations.save(&citation).await.unwrap();

        let mut article = Article::draft("clean", "Clean").with_author(author);
        article.content = format!("Well sourced [cit:{id}] text.");
        article.link_citation(id);
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.articles_scanned, 1);
        assert!(report.violations.is_empty());
        assert!(report.penalties.is_empty());
    }

    #[tokio::test]
    async fn test_unlinked_tag_costs_a_nickel() {
        let fixture = fixture();
        let author = seed_author(&fixture, "agent:a").await;

        // Record exists globally but the article never linked it.
        let citation = Citation::new("https://example.org", "Paper");
        let id = citation.id;
        fixture.citations.save(&citation).await.unwrap();

        let mut article = Article::draft("sloppy", "Sloppy").with_author(author.clone());
        article.content = format!("See [cit:{id}].");
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::MissingLink);
        assert!((report.penalties[&author] - 0.05).abs() < 1e-9);

        let agent = fixture.agents.find_by_id(&author).await.unwrap().unwrap();
        assert!((agent.alignment_score - 0.75).abs() < 1e-9);
        assert!((agent.competence_score - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fabricated_tag_costs_a_dime() {
        let fixture = fixture();
        let author = seed_author(&fixture, "agent:a").await;

        let mut article = Article::draft("fabricated", "Fabricated").with_author(author.clone());
        article.content = format!("Trust me [cit:{}].", Uuid::new_v4());
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.violations[0].kind, ViolationKind::MissingRecord);
        assert!((report.penalties[&author] - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_tag_counts_as_missing_record() {
        let fixture = fixture();
        let author = seed_author(&fixture, "agent:a").await;

        let mut article = Article::draft("garbled", "Garbled").with_author(author.clone());
        article.content = "As shown in [cit:not-a-uuid].".to_string();
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.violations[0].kind, ViolationKind::MissingRecord);
        assert!((report.penalties[&author] - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_penalties_accumulate_per_author() {
        let fixture = fixture();
        let author = seed_author(&fixture, "agent:a").await;

        let mut article = Article::draft("repeat-offender", "Repeat").with_author(author.clone());
        article.content = format!("[cit:{}] and [cit:{}]", Uuid::new_v4(), Uuid::new_v4());
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.violations.len(), 2);
        assert!((report.penalties[&author] - 0.2).abs() < 1e-9);

        let agent = fixture.agents.find_by_id(&author).await.unwrap().unwrap();
        assert!((agent.alignment_score - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_authorless_article_reports_without_penalty() {
        let fixture = fixture();

        let mut article = Article::draft("orphan", "Orphan");
        article.content = format!("[cit:{}]", Uuid::new_v4());
        fixture.articles.save(&article).await.unwrap();

        let report = fixture.auditor.run().await.unwrap();
        assert_eq!(report.violations.len(), 1);
        assert!(report.penalties.is_empty());
    }
}
