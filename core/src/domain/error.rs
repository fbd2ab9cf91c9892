// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Ledger error taxonomy.
//!
//! Every service surfaces these distinct, inspectable kinds to the caller;
//! nothing is silently swallowed except best-effort discovery failures,
//! which are logged and skipped per article.

use thiserror::Error;

use super::agent::Tier;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("tier {actual} is below the required floor {required}")]
    ForbiddenTier { required: Tier, actual: Tier },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
