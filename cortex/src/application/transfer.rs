// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! PropertyTransferEngine: predicts cross-domain property correspondences
//! over verified isomorphisms.
//!
//! A latent property on side A that the mapping does not yet cover becomes
//! a prediction that side B has a counterpart. Confirmation is purely
//! lexical against the curated synonym table; a confirmed pair is written
//! back into the isomorphism's mapping, an unconfirmed prediction is
//! reported but never persisted.

use std::sync::Arc;
use tracing::{debug, info};

use noograph_core::domain::{
    Article, Isomorphism, IsomorphismId, IsomorphismStatus, LedgerError, LedgerResult,
};
use noograph_core::infrastructure::repository::{ArticleRepository, IsomorphismRepository};

use crate::domain::CortexConfig;

/// One predicted property correspondence.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPrediction {
    /// Property name on side A.
    pub property: String,
    /// Matched property name on side B, when the synonym table confirms
    /// one.
    pub matched: Option<String>,
}

impl TransferPrediction {
    pub fn confirmed(&self) -> bool {
        self.matched.is_some()
    }
}

pub struct PropertyTransferEngine {
    articles: Arc<dyn ArticleRepository>,
    isomorphisms: Arc<dyn IsomorphismRepository>,
    config: Arc<CortexConfig>,
}

impl PropertyTransferEngine {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        isomorphisms: Arc<dyn IsomorphismRepository>,
        config: Arc<CortexConfig>,
    ) -> Self {
        Self { articles, isomorphisms, config }
    }

    /// Predict property correspondences for a verified isomorphism,
    /// writing confirmed matches back into its mapping.
    pub async fn predict(&self, iso_id: IsomorphismId) -> LedgerResult<Vec<TransferPrediction>> {
        let mut iso = self
            .isomorphisms
            .find_by_id(iso_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("isomorphism", iso_id))?;
        if iso.status != IsomorphismStatus::Verified {
            return Err(LedgerError::Validation(
                "property transfer requires a verified isomorphism".to_string(),
            ));
        }

        let article_a = self.article(&iso.article_a).await?;
        let article_b = self.article(&iso.article_b).await?;

        let predictions = predict_properties(&article_a, &article_b, &iso, &self.config);
        let confirmed = predictions.iter().filter(|p| p.confirmed()).count();

        if confirmed > 0 {
            for prediction in &predictions {
                if let Some(matched) = &prediction.matched {
                    iso.mapping.insert(prediction.property.clone(), matched.clone());
                }
            }
            self.isomorphisms.save(&iso).await?;
        }

        info!(
            isomorphism = %iso_id,
            predictions = predictions.len(),
            confirmed,
            "property transfer complete"
        );
        Ok(predictions)
    }

    async fn article(&self, slug: &str) -> LedgerResult<Article> {
        self.articles
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| LedgerError::not_found("article", slug))
    }
}

fn predict_properties(
    article_a: &Article,
    article_b: &Article,
    iso: &Isomorphism,
    config: &CortexConfig,
) -> Vec<TransferPrediction> {
    let mut predictions = Vec::new();
    for property in &article_a.relational_map.latent_properties {
        if iso.mapping.contains_key(&property.name) {
            continue;
        }
        let matched = article_b
            .relational_map
            .latent_properties
            .iter()
            .find(|candidate| config.are_synonyms(&property.name, &candidate.name))
            .map(|candidate| candidate.name.clone());
        if matched.is_none() {
            debug!(property = %property.name, "prediction unconfirmed");
        }
        predictions.push(TransferPrediction { property: property.name.clone(), matched });
    }
    predictions
}
