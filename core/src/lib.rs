// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Sagacity governance ledger.
//!
//! Reputation scoring, certification, weighted consensus, citation quality,
//! and identity verification for the knowledge graph.
//!
//! # Architecture
//!
//! - **Layer:** Governance Core
//! - **Purpose:** Implements the sagacity ledger and its consensus rules

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
