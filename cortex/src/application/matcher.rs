// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! StructuralMatcher: graph similarity and isomorphism mapping proposals.
//!
//! Matching is edge-type-aware: an edge corresponds only if its type label
//! corresponds. Exact matching backtracks over degree-compatible node
//! assignments; when no exact or subgraph isomorphism exists the proposal
//! falls back to pairing nodes by degree-centrality rank. The fallback is
//! an approximation, not a structural guarantee, and the proposal's
//! `isomorphic`/`subgraph_isomorphic` flags tell callers which case they
//! got.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

use noograph_core::application::PermissionGate;
use noograph_core::domain::{
    AgentId, Article, Isomorphism, LedgerError, LedgerResult, Tier,
};
use noograph_core::infrastructure::repository::{ArticleRepository, IsomorphismRepository};

use crate::domain::StructuralGraph;

pub struct StructuralMatcher {
    articles: Arc<dyn ArticleRepository>,
    isomorphisms: Arc<dyn IsomorphismRepository>,
    gate: Arc<dyn PermissionGate>,
}

impl StructuralMatcher {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        isomorphisms: Arc<dyn IsomorphismRepository>,
        gate: Arc<dyn PermissionGate>,
    ) -> Self {
        Self { articles, isomorphisms, gate }
    }

    /// Propose a structural mapping between two articles and persist it as
    /// a `Proposed` isomorphism.
    pub async fn propose_mapping(
        &self,
        agent_id: &AgentId,
        slug_a: &str,
        slug_b: &str,
    ) -> LedgerResult<Isomorphism> {
        self.gate.require_tier(agent_id, Tier::Contributor).await?;
        if slug_a == slug_b {
            return Err(LedgerError::Validation(
                "cannot map an article onto itself".to_string(),
            ));
        }

        let article_a = self.article(slug_a).await?;
        let article_b = self.article(slug_b).await?;
        let graph_a = StructuralGraph::from_relational_map(&article_a.relational_map);
        let graph_b = StructuralGraph::from_relational_map(&article_b.relational_map);

        let matched = match_graphs(&graph_a, &graph_b);
        let confidence = similarity(&graph_a, &graph_b);

        let mut iso = Isomorphism::propose(
            slug_a,
            slug_b,
            matched.mapping,
            confidence,
            Some(agent_id.clone()),
        );
        iso.isomorphic = matched.isomorphic;
        iso.subgraph_isomorphic = matched.subgraph_isomorphic;
        self.isomorphisms.save(&iso).await?;

        info!(
            article_a = slug_a,
            article_b = slug_b,
            agent = %agent_id,
            confidence,
            isomorphic = iso.isomorphic,
            subgraph = iso.subgraph_isomorphic,
            "isomorphism proposed"
        );
        Ok(iso)
    }

    async fn article(&self, slug: &str) -> LedgerResult<Article> {
        self.articles
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| LedgerError::not_found("article", slug))
    }
}

/// Composite structural similarity:
/// `0.6 * jaccard(predicates) + 0.4 * jaccard(links)`.
///
/// Predicate term is 0 when either predicate set is empty. Link term is 1.0
/// when both link sets are empty (vacuously similar), 0 when exactly one is.
pub fn similarity(a: &StructuralGraph, b: &StructuralGraph) -> f64 {
    let predicate_term = if a.predicates.is_empty() || b.predicates.is_empty() {
        0.0
    } else {
        jaccard(&a.predicates, &b.predicates)
    };

    let link_term = match (a.edges.is_empty(), b.edges.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => jaccard(&a.edges, &b.edges),
    };

    0.6 * predicate_term + 0.4 * link_term
}

fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Degree-sequence similarity, a cheap structural heuristic: align the
/// descending degree sequences, zero-pad to equal length, `Σmin / Σmax`.
/// An approximation only; identical sequences do not imply isomorphism.
pub fn degree_sequence_similarity(a: &StructuralGraph, b: &StructuralGraph) -> f64 {
    sequence_overlap(a.degree_sequence(), b.degree_sequence())
}

/// Zero-pad two aligned sequences to equal length, then `Σmin / Σmax`.
fn sequence_overlap(mut a: Vec<usize>, mut b: Vec<usize>) -> f64 {
    let len = a.len().max(b.len());
    if len == 0 {
        return 1.0;
    }
    a.resize(len, 0);
    b.resize(len, 0);

    let (mut sum_min, mut sum_max) = (0usize, 0usize);
    for (x, y) in a.iter().zip(&b) {
        sum_min += x.min(y);
        sum_max += x.max(y);
    }
    if sum_max == 0 {
        1.0
    } else {
        sum_min as f64 / sum_max as f64
    }
}

pub(crate) struct MatchOutcome {
    pub mapping: BTreeMap<String, String>,
    pub isomorphic: bool,
    pub subgraph_isomorphic: bool,
}

/// Attempt exact, then subgraph (smaller into larger), then fall back to
/// degree-centrality positional pairing. The mapping always reads A → B.
pub(crate) fn match_graphs(a: &StructuralGraph, b: &StructuralGraph) -> MatchOutcome {
    if a.node_count() == b.node_count() && a.edge_count() == b.edge_count() {
        if let Some(mapping) = find_embedding(a, b, true) {
            return MatchOutcome { mapping, isomorphic: true, subgraph_isomorphic: true };
        }
    }

    if a.node_count() <= b.node_count() {
        if let Some(mapping) = find_embedding(a, b, false) {
            return MatchOutcome { mapping, isomorphic: false, subgraph_isomorphic: true };
        }
    } else if let Some(mapping) = find_embedding(b, a, false) {
        // B embeds into A; invert so the mapping still reads A -> B.
        let mapping = mapping.into_iter().map(|(from_b, to_a)| (to_a, from_b)).collect();
        return MatchOutcome { mapping, isomorphic: false, subgraph_isomorphic: true };
    }

    debug!("no isomorphism found, falling back to centrality pairing");
    let mapping = a
        .nodes_by_centrality()
        .into_iter()
        .zip(b.nodes_by_centrality())
        .map(|(x, y)| (x.to_string(), y.to_string()))
        .collect();
    MatchOutcome { mapping, isomorphic: false, subgraph_isomorphic: false }
}

/// Backtracking search for an edge-type-preserving embedding of `small`
/// into `large`. With `exact`, the correspondence must be edge-exact in
/// both directions (an isomorphism when the graphs are the same size).
fn find_embedding(
    small: &StructuralGraph,
    large: &StructuralGraph,
    exact: bool,
) -> Option<BTreeMap<String, String>> {
    // High-degree nodes first: fewer candidates, earlier pruning.
    let order = small.nodes_by_centrality();
    let candidates: Vec<&str> = large.nodes.iter().map(String::as_str).collect();
    let mut assignment: BTreeMap<&str, &str> = BTreeMap::new();
    let mut used: BTreeSet<&str> = BTreeSet::new();

    fn consistent(
        small: &StructuralGraph,
        large: &StructuralGraph,
        exact: bool,
        assignment: &BTreeMap<&str, &str>,
        node: &str,
        image: &str,
    ) -> bool {
        // Self-loops are edges too.
        let loops = edge_types(small, node, node);
        let image_loops = edge_types(large, image, image);
        if exact {
            if loops != image_loops {
                return false;
            }
        } else if !loops.is_subset(&image_loops) {
            return false;
        }
        for (&mapped, &mapped_image) in assignment {
            let forward = edge_types(small, node, mapped);
            let forward_image = edge_types(large, image, mapped_image);
            let backward = edge_types(small, mapped, node);
            let backward_image = edge_types(large, mapped_image, image);
            if exact {
                if forward != forward_image || backward != backward_image {
                    return false;
                }
            } else if !forward.is_subset(&forward_image) || !backward.is_subset(&backward_image) {
                return false;
            }
        }
        true
    }

    fn backtrack<'g>(
        small: &'g StructuralGraph,
        large: &'g StructuralGraph,
        exact: bool,
        order: &[&'g str],
        candidates: &[&'g str],
        assignment: &mut BTreeMap<&'g str, &'g str>,
        used: &mut BTreeSet<&'g str>,
        depth: usize,
    ) -> bool {
        let Some(&node) = order.get(depth) else {
            return true;
        };
        let degree = small.degree(node);
        for &image in candidates {
            if used.contains(image) {
                continue;
            }
            let image_degree = large.degree(image);
            let degree_ok = if exact { image_degree == degree } else { image_degree >= degree };
            if !degree_ok || !consistent(small, large, exact, assignment, node, image) {
                continue;
            }
            assignment.insert(node, image);
            used.insert(image);
            if backtrack(small, large, exact, order, candidates, assignment, used, depth + 1) {
                return true;
            }
            assignment.remove(node);
            used.remove(image);
        }
        false
    }

    if backtrack(small, large, exact, &order, &candidates, &mut assignment, &mut used, 0) {
        Some(
            assignment
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    } else {
        None
    }
}

fn edge_types<'g>(graph: &'g StructuralGraph, source: &str, target: &str) -> BTreeSet<&'g str> {
    graph
        .edges
        .iter()
        .filter(|e| e.source == source && e.target == target)
        .map(|e| e.edge_type.as_str())
        .collect()
}
