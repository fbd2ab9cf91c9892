// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Domain layer for the governance ledger.

pub mod agent;
pub mod article;
pub mod citation;
pub mod config;
pub mod error;
pub mod events;
pub mod exam;
pub mod isomorphism;
pub mod task;
pub mod verification;
pub mod vote;

pub use agent::*;
pub use article::*;
pub use citation::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use exam::*;
pub use isomorphism::*;
pub use task::*;
pub use verification::*;
pub use vote::*;
