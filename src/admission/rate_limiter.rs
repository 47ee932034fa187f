//! In-memory fixed window rate limiting.
//!
//! Counters live in process memory so they are only correct for a
//! single server process. Running more than one instance needs a
//! shared counter store instead.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::core::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

/// Per-key fixed window counters. Cloning shares the counters.
///
/// Records sit in a `DashMap` so requests for different keys only
/// contend when they land on the same shard, and sweeping never takes
/// more than one shard at a time.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Arc<DashMap<String, RateLimitRecord>>,
}

/// The window for one key, locked until it is dropped or counted.
///
/// Holding a slot keeps other requests for the same key (and shard)
/// waiting, so a check and the count that follows it can't be split
/// by a concurrent request.
pub struct WindowSlot<'a> {
    config: RateLimitConfig,
    entry: Entry<'a, String, RateLimitRecord>,
}

impl WindowSlot<'_> {
    fn record(&self) -> Option<&RateLimitRecord> {
        match &self.entry {
            Entry::Occupied(entry) => Some(entry.get()),
            Entry::Vacant(_) => None,
        }
    }

    /// Whether one more request fits in the current window. Does not
    /// count the request.
    pub fn has_capacity(&self) -> bool {
        let max = self.config.max_requests;
        match self.record() {
            Some(record) => record.count < max,
            None => max > 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        let max = self.config.max_requests;
        self.record()
            .map_or(max, |record| max.saturating_sub(record.count))
    }

    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Time left until the window resets, zero if there is no open
    /// window.
    pub fn reset_in(&self, now: DateTime<Utc>) -> TimeDelta {
        self.record()
            .map(|record| (record.reset_time - now).max(TimeDelta::zero()))
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Count the request, opening a new window if there is none.
    /// Returns what is left in the window.
    pub fn commit(self, now: DateTime<Utc>) -> u32 {
        let max = self.config.max_requests;
        let count = match self.entry {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.count += 1;
                record.count
            }
            Entry::Vacant(entry) => {
                entry.insert(RateLimitRecord {
                    count: 1,
                    reset_time: now + self.config.window(),
                });
                1
            }
        };
        max.saturating_sub(count)
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Arc::new(DashMap::new()),
        }
    }

    /// Lock the window for `key`. An expired record is dropped first so
    /// the slot starts a fresh window.
    pub fn slot(&self, key: &str, now: DateTime<Utc>) -> WindowSlot<'_> {
        let entry = match self.records.entry(key.to_string()) {
            Entry::Occupied(entry) if now > entry.get().reset_time => {
                let (key, _) = entry.remove_entry();
                self.records.entry(key)
            }
            entry => entry,
        };
        WindowSlot {
            config: self.config,
            entry,
        }
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Utc::now())
    }

    /// Check and count in one step. Returns `false` without counting
    /// once the window is full.
    pub fn is_allowed_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let slot = self.slot(key, now);
        if slot.has_capacity() {
            slot.commit(now);
            true
        } else {
            false
        }
    }

    pub fn remaining(&self, key: &str) -> u32 {
        let max = self.config.max_requests;
        self.records
            .get(key)
            .map_or(max, |record| max.saturating_sub(record.count))
    }

    pub fn reset_time(&self, key: &str) -> Option<DateTime<Utc>> {
        self.records.get(key).map(|record| record.reset_time)
    }

    pub fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.get(key).map(|record| *record)
    }

    /// Remove every record whose window has passed. Returns how many
    /// were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let live = now <= record.reset_time;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Number of tracked keys, expired or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
