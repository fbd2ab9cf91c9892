// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! SynthesisEngine: abstracts a verified isomorphism into a primitive
//! article.
//!
//! The primitive is keyed by slug (`primitive-{a}-{b}`) and upserted, so
//! re-running synthesis refreshes the existing article instead of creating
//! a sibling. Primitives enter the graph in `NeedsReview` and go through
//! the same consensus gate as authored articles.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use noograph_core::application::{EventBus, PermissionGate};
use noograph_core::domain::{
    AgentId, Article, ArticleStatus, Isomorphism, IsomorphismId, IsomorphismStatus, LedgerError,
    LedgerEvent, LedgerResult, MappedProperty, RelationalMap, Tier,
};
use noograph_core::infrastructure::repository::{ArticleRepository, IsomorphismRepository};

pub struct SynthesisEngine {
    articles: Arc<dyn ArticleRepository>,
    isomorphisms: Arc<dyn IsomorphismRepository>,
    gate: Arc<dyn PermissionGate>,
    event_bus: Arc<dyn EventBus>,
}

impl SynthesisEngine {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        isomorphisms: Arc<dyn IsomorphismRepository>,
        gate: Arc<dyn PermissionGate>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self { articles, isomorphisms, gate, event_bus }
    }

    /// Synthesize (or refresh) the primitive article for a verified
    /// isomorphism. Returns the primitive's slug.
    pub async fn synthesize(
        &self,
        agent_id: &AgentId,
        iso_id: IsomorphismId,
    ) -> LedgerResult<String> {
        self.gate.require_tier(agent_id, Tier::Architect).await?;

        let iso = self
            .isomorphisms
            .find_by_id(iso_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("isomorphism", iso_id))?;
        if iso.status != IsomorphismStatus::Verified {
            return Err(LedgerError::Validation(
                "synthesis requires a verified isomorphism".to_string(),
            ));
        }

        let article_a = self.article(&iso.article_a).await?;
        let article_b = self.article(&iso.article_b).await?;

        let shared_predicates: std::collections::BTreeSet<String> = article_a
            .relational_map
            .predicates
            .intersection(&article_b.relational_map.predicates)
            .cloned()
            .collect();
        let mapped_properties = abstract_properties(&article_a, &article_b, &iso);

        let slug = format!("primitive-{}-{}", iso.article_a, iso.article_b);
        let (mut primitive, updated) = match self.articles.find_by_slug(&slug).await? {
            Some(existing) => (existing, true),
            None => {
                let title = format!(
                    "Primitive: {} / {}",
                    article_a.title, article_b.title
                );
                (Article::draft(&slug, title), false)
            }
        };

        primitive.content = render_content(&article_a, &article_b, &shared_predicates, &mapped_properties);
        primitive.relational_map = RelationalMap {
            predicates: shared_predicates,
            links: Default::default(),
            latent_properties: Vec::new(),
            mapped_properties,
            mapping_ref: Some(iso_id),
            is_primitive: true,
        };
        if primitive.status == ArticleStatus::Draft {
            primitive.status = ArticleStatus::NeedsReview;
        }
        primitive.touch();
        self.articles.save(&primitive).await?;

        info!(isomorphism = %iso_id, slug, updated, "primitive synthesized");
        self.event_bus
            .publish(LedgerEvent::PrimitiveSynthesized {
                isomorphism_id: iso_id,
                slug: slug.clone(),
                updated,
                timestamp: Utc::now(),
            })
            .await?;
        Ok(slug)
    }

    async fn article(&self, slug: &str) -> LedgerResult<Article> {
        self.articles
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| LedgerError::not_found("article", slug))
    }
}

/// A mapped property is abstracted only when both sides of the mapping pair
/// resolve to a known latent property.
fn abstract_properties(
    article_a: &Article,
    article_b: &Article,
    iso: &Isomorphism,
) -> Vec<MappedProperty> {
    let mut properties = Vec::new();
    for (key_a, key_b) in &iso.mapping {
        let Some(prop_a) = article_a.relational_map.latent_property(key_a) else {
            continue;
        };
        let Some(prop_b) = article_b.relational_map.latent_property(key_b) else {
            continue;
        };
        properties.push(MappedProperty {
            abstract_name: format!("{key_a}_{key_b}"),
            source_a: key_a.clone(),
            source_b: key_b.clone(),
            description: format!("{} | {}", prop_a.description, prop_b.description),
        });
    }
    properties
}

fn render_content(
    article_a: &Article,
    article_b: &Article,
    shared_predicates: &std::collections::BTreeSet<String>,
    mapped_properties: &[MappedProperty],
) -> String {
    let mut content = format!(
        "# Shared structure of {} and {}\n\n\
         Abstracted from the verified structural correspondence between\n\
         `{}` and `{}`.\n",
        article_a.title, article_b.title, article_a.slug, article_b.slug,
    );
    if !shared_predicates.is_empty() {
        content.push_str("\n## Shared predicates\n\n");
        for predicate in shared_predicates {
            content.push_str(&format!("- `{predicate}`\n"));
        }
    }
    if !mapped_properties.is_empty() {
        content.push_str("\n## Abstracted properties\n\n");
        for property in mapped_properties {
            content.push_str(&format!(
                "- **{}** ({} ↔ {}): {}\n",
                property.abstract_name, property.source_a, property.source_b,
                property.description,
            ));
        }
    }
    content
}
