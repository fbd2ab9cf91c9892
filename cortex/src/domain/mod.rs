// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Domain types for the discovery pipeline.

pub mod config;
pub mod graph;

pub use config::CortexConfig;
pub use graph::{Edge, StructuralGraph};
