// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Application services for the discovery pipeline.

pub mod discovery;
pub mod matcher;
pub mod synthesis;
pub mod transfer;

pub use discovery::{CandidateDiscovery, CandidatePair};
pub use matcher::{degree_sequence_similarity, similarity, StructuralMatcher};
pub use synthesis::SynthesisEngine;
pub use transfer::{PropertyTransferEngine, TransferPrediction};
