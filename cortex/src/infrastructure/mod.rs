// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the discovery pipeline.

pub mod vector_index;

pub use vector_index::{cosine_similarity, InMemoryVectorIndex, SearchHit, VectorIndex};
