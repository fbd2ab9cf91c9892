// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Keyed exclusive locks over target aggregates.
//!
//! The ledger must serialize read-modify-write of a target's cached
//! consensus weight: two concurrent casts reading a stale total would lose
//! one transition. This registry hands out one async mutex per target key;
//! a production deployment can substitute database row locks behind the
//! same acquire-guard discipline.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct TargetLockRegistry {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TargetLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for a target key. The returned guard
    /// releases on drop, covering all exit paths including errors.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
