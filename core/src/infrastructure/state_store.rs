// Copyright (c) 2026 Noograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Keyed transient state with per-entry expiry.
//!
//! Pending exams and bind challenges are per-agent keyed records with a
//! TTL, not process-wide maps: the keyed store is the unit a multi-instance
//! deployment would replicate. Re-issuing a key overwrites the previous
//! entry.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct KeyedTtlStore<V> {
    entries: Mutex<HashMap<String, (V, DateTime<Utc>)>>,
}

impl<V: Clone> KeyedTtlStore<V> {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Insert or overwrite the entry for a key.
    pub fn put(&self, key: impl Into<String>, value: V, expires_at: DateTime<Utc>) {
        let mut entries = self.entries.lock();
        entries.insert(key.into(), (value, expires_at));
    }

    /// Read without consuming. Expired entries are dropped and read as
    /// absent.
    pub fn peek(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((_, expires_at)) if now >= *expires_at => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    /// Remove and return the entry for a key, if present and unexpired.
    pub fn take(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries.lock();
        let (value, expires_at) = entries.remove(key)?;
        if now >= expires_at {
            None
        } else {
            Some(value)
        }
    }

    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        entries.remove(key);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| now < *expires_at);
        before - entries.len()
    }
}

impl<V: Clone> Default for KeyedTtlStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
