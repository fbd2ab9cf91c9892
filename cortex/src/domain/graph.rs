// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Directed typed graph view over an article's relational map.
//!
//! The matcher never touches articles directly; it works on this
//! projection, which carries only what structural matching needs: the node
//! set, the typed edge set, and per-node degrees.

use std::collections::{BTreeMap, BTreeSet};

use noograph_core::domain::RelationalMap;

/// A typed directed edge between named nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub edge_type: String,
}

/// Structural projection of a relational map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralGraph {
    pub predicates: BTreeSet<String>,
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<Edge>,
}

impl StructuralGraph {
    pub fn from_relational_map(map: &RelationalMap) -> Self {
        let mut nodes = BTreeSet::new();
        let mut edges = BTreeSet::new();
        for link in &map.links {
            nodes.insert(link.source.clone());
            nodes.insert(link.target.clone());
            edges.insert(Edge {
                source: link.source.clone(),
                target: link.target.clone(),
                edge_type: link.link_type.clone(),
            });
        }
        Self { predicates: map.predicates.clone(), nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total degree (in + out) per node.
    pub fn degrees(&self) -> BTreeMap<&str, usize> {
        let mut degrees: BTreeMap<&str, usize> =
            self.nodes.iter().map(|n| (n.as_str(), 0)).collect();
        for edge in &self.edges {
            if let Some(d) = degrees.get_mut(edge.source.as_str()) {
                *d += 1;
            }
            if let Some(d) = degrees.get_mut(edge.target.as_str()) {
                *d += 1;
            }
        }
        degrees
    }

    pub fn degree(&self, node: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source == node || e.target == node)
            .count()
    }

    /// Degree sequence in descending order.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut sequence: Vec<usize> = self.degrees().values().copied().collect();
        sequence.sort_unstable_by(|a, b| b.cmp(a));
        sequence
    }

    /// Nodes ranked by descending degree, ties broken alphabetically so the
    /// ranking is deterministic.
    pub fn nodes_by_centrality(&self) -> Vec<&str> {
        let degrees = self.degrees();
        let mut nodes: Vec<&str> = self.nodes.iter().map(String::as_str).collect();
        nodes.sort_by(|a, b| degrees[b].cmp(&degrees[a]).then(a.cmp(b)));
        nodes
    }

    /// Whether the typed edge `source -> target` exists.
    pub fn has_edge(&self, source: &str, target: &str, edge_type: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target && e.edge_type == edge_type)
    }
}
