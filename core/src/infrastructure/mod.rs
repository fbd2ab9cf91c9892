// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer for the governance ledger.

pub mod locks;
pub mod memory;
pub mod repository;
pub mod state_store;

pub use locks::TargetLockRegistry;
pub use memory::{
    InMemoryAgentRepository, InMemoryArticleRepository, InMemoryCitationRepository,
    InMemoryIsomorphismRepository, InMemoryTaskRepository, InMemoryVerificationRepository,
    InMemoryVoteRepository,
};
pub use repository::{
    AgentRepository, ArticleRepository, CitationRepository, IsomorphismRepository, TaskRepository,
    VerificationRepository, VoteRepository,
};
pub use state_store::KeyedTtlStore;
