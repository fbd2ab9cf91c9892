// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Discovery pipeline configuration.

use serde::{Deserialize, Serialize};

/// Tuning for candidate discovery and property transfer. The synonym table
/// is a closed, curated list supplied by configuration; the transfer engine
/// never infers pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Minimum cosine similarity for a discovery hit.
    pub similarity_threshold: f32,
    /// Hits retained per article during a cross-domain scan.
    pub candidates_per_article: usize,
    /// Known cross-domain property synonym pairs, matched in either
    /// orientation.
    pub synonym_pairs: Vec<(String, String)>,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            candidates_per_article: 5,
            synonym_pairs: vec![
                ("resilience".to_string(), "fault_tolerance".to_string()),
                ("resource_sharing".to_string(), "load_balancing".to_string()),
            ],
        }
    }
}

impl CortexConfig {
    /// Whether two property names are synonyms under the curated table
    /// (either orientation), or literally equal.
    pub fn are_synonyms(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        self.synonym_pairs
            .iter()
            .any(|(left, right)| (left == a && right == b) || (left == b && right == a))
    }
}
