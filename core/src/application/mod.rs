// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Application services for the governance ledger.

pub mod audit;
pub mod citations;
pub mod consensus;
pub mod identity;
pub mod sagacity;
pub mod tasks;

pub use audit::{AuditReport, AuditViolation, ConsistencyAuditor, ViolationKind};
pub use citations::CitationQualityAggregator;
pub use consensus::{ConsensusLedger, TargetStatus, VoteReceipt};
pub use identity::IdentityService;
pub use sagacity::{PermissionGate, SagacityEngine};
pub use tasks::TaskBoard;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::domain::LedgerEvent;

/// Event bus for publishing ledger domain events.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> Result<()>;
}

/// Default bus: emits each event as a structured log line.
pub struct TracingEventBus;

#[async_trait]
impl EventBus for TracingEventBus {
    async fn publish(&self, event: LedgerEvent) -> Result<()> {
        info!(event_type = event.event_type(), event = ?event, "ledger event");
        Ok(())
    }
}
