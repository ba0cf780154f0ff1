//! Two-pass eviction: age expiry first, then least-recently-used.
//!
//! Old entries go before recently-unused ones. The LRU pass only engages when
//! expiry alone does not bring the store back within capacity.

// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheConfig, CacheEntry};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// What caused an eviction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionTrigger {
    /// An insert pushed the store above `max_entries`.
    Capacity,
    /// An explicit `cleanup` call.
    Explicit,
}

/// Number of entries removed by each pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvictionReport {
    pub expired: usize,
    pub evicted_lru: usize,
}

impl EvictionReport {
    pub fn total(&self) -> usize {
        self.expired + self.evicted_lru
    }
}

/// Remove expired entries, then the least recently accessed ones until at
/// most `config.max_entries` remain.
pub fn evict(
    entries: &mut HashMap<String, CacheEntry>,
    config: &CacheConfig,
    now: DateTime<Utc>,
    trigger: EvictionTrigger,
) -> EvictionReport {
    let max_age = Duration::days(i64::from(config.max_age_days));

    // Age pass. An unparsable creation time counts as expired.
    let mut marked: HashSet<String> = entries
        .iter()
        .filter(|(_, entry)| match entry.created_at() {
            Some(created_at) => now - created_at > max_age,
            None => true,
        })
        .map(|(key, _)| key.clone())
        .collect();
    let expired = marked.len();

    // Capacity pass
    let remaining = entries.len() - marked.len();
    let mut evicted_lru = 0;
    if remaining > config.max_entries {
        let mut candidates: Vec<(&String, &CacheEntry)> = entries
            .iter()
            .filter(|(key, _)| !marked.contains(*key))
            .collect();

        // None sorts before Some, so unreadable access times go first
        candidates.sort_by(|(key_a, a), (key_b, b)| {
            a.last_accessed_at()
                .cmp(&b.last_accessed_at())
                .then_with(|| a.created_at().cmp(&b.created_at()))
                .then_with(|| key_a.cmp(key_b))
        });

        evicted_lru = remaining - config.max_entries;
        let lru_keys: Vec<String> = candidates
            .iter()
            .take(evicted_lru)
            .map(|(key, _)| (*key).clone())
            .collect();
        marked.extend(lru_keys);
    }

    entries.retain(|key, _| !marked.contains(key));

    let report = EvictionReport {
        expired,
        evicted_lru,
    };

    match trigger {
        EvictionTrigger::Capacity => debug!(
            "Capacity eviction removed {} expired and {} least-recently-used entries ({} remain)",
            report.expired,
            report.evicted_lru,
            entries.len()
        ),
        EvictionTrigger::Explicit => info!(
            "Cleanup removed {} expired and {} least-recently-used entries ({} remain)",
            report.expired,
            report.evicted_lru,
            entries.len()
        ),
    }

    report
}
