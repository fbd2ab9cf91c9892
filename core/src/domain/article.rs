// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Article aggregate and its relational map.
//!
//! The relational map is the article's graph representation: the predicate
//! vocabulary it uses, its typed links, and the latent properties extracted
//! from its content. The isomorphism pipeline operates entirely on these
//! maps; the article body is only consulted by the consistency audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::agent::AgentId;
use super::citation::CitationId;
use super::isomorphism::IsomorphismId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleStatus {
    Draft,
    NeedsReview,
    Active,
    Archived,
}

/// A typed, directed link between two named nodes of a relational map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub link_type: String,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
        }
    }
}

/// A latent property surfaced from an article's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentProperty {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// A property abstracted from a verified node mapping during synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedProperty {
    pub abstract_name: String,
    pub source_a: String,
    pub source_b: String,
    pub description: String,
}

/// Structured graph description of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationalMap {
    #[serde(default)]
    pub predicates: BTreeSet<String>,
    #[serde(default)]
    pub links: BTreeSet<Link>,
    #[serde(default)]
    pub latent_properties: Vec<LatentProperty>,
    /// Present only on synthesized primitives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapped_properties: Vec<MappedProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_ref: Option<IsomorphismId>,
    #[serde(default)]
    pub is_primitive: bool,
}

impl RelationalMap {
    /// Look up a latent property by name.
    pub fn latent_property(&self, name: &str) -> Option<&LatentProperty> {
        self.latent_properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub domain: Option<String>,
    pub content: String,
    pub author_id: Option<AgentId>,
    pub status: ArticleStatus,
    /// Derived from linked citation quality; 0.5 when no citations are
    /// linked.
    pub confidence_score: f64,
    pub relational_map: RelationalMap,
    /// Cached consensus weight from the last recompute.
    pub total_weight: f64,
    /// Index-based many-to-many with citations.
    pub citation_ids: Vec<CitationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn draft(slug: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            title: title.into(),
            domain: None,
            content: String::new(),
            author_id: None,
            status: ArticleStatus::Draft,
            confidence_score: 0.5,
            relational_map: RelationalMap::default(),
            total_weight: 0.0,
            citation_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_author(mut self, author: AgentId) -> Self {
        self.author_id = Some(author);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Link a citation, ignoring duplicates.
    pub fn link_citation(&mut self, citation_id: CitationId) {
        if !self.citation_ids.contains(&citation_id) {
            self.citation_ids.push(citation_id);
            self.touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let article = Article::draft("mycelial-network", "Mycelial Network");
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.confidence_score, 0.5);
        assert!(article.relational_map.predicates.is_empty());
        assert!(!article.relational_map.is_primitive);
    }

    #[test]
    fn test_link_citation_deduplicates() {
        let mut article = Article::draft("p2p-network", "P2P Network");
        let id = CitationId::new();
        article.link_citation(id);
        article.link_citation(id);
        assert_eq!(article.citation_ids.len(), 1);
    }

    #[test]
    fn test_relational_map_round_trip() {
        let mut map = RelationalMap::default();
        map.predicates.insert("decomposes".to_string());
        map.links.insert(Link::new("hypha", "nutrient", "transfers"));
        map.latent_properties.push(LatentProperty {
            name: "resilience".to_string(),
            value: "high".to_string(),
            description: "Redundant pathways survive damage.".to_string(),
        });

        let json = serde_json::to_string(&map).unwrap();
        let back: RelationalMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
        assert!(back.latent_property("resilience").is_some());
    }
}
