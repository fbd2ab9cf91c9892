// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Isomorphism discovery and synthesis engine.
//!
//! Vector candidate discovery, structural matching, property transfer, and
//! primitive synthesis over the knowledge graph's relational maps.
//!
//! # Architecture
//!
//! - **Layer:** Discovery Pipeline
//! - **Purpose:** Implements cross-domain isomorphism discovery

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
