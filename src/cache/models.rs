//! Cache configuration, entry and statistics models.
//!
//! These types are persisted verbatim in the cache file, so field names are
//! part of the on-disk format.

// Author: kelexine (https://github.com/kelexine)

use crate::models::{LlmProvider, UsageInfo};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the commit message cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry count above which eviction runs on insert.
    /// Default: `1000`
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Entries created longer ago than this are expired.
    /// Default: `30`
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Suggested interval between explicit `cleanup` runs. Nothing schedules
    /// it; eviction only happens inside `set` and `cleanup`.
    /// Default: `24`
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u32,

    /// Location of the JSON cache file.
    /// Default: `<config dir>/commit-msg/cache.json`
    #[serde(default = "default_cache_file_path")]
    pub cache_file_path: PathBuf,
}

impl CacheConfig {
    /// Default configuration backed by a specific file.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            cache_file_path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            max_age_days: default_max_age_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
            cache_file_path: default_cache_file_path(),
        }
    }
}

/// One cached generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub message: String,
    pub provider: LlmProvider,
    /// Fingerprint of the normalized diff and options (the key without its
    /// provider prefix).
    pub diff_hash: String,
    #[serde(default)]
    pub style_instruction: String,
    pub attempt: u32,
    /// RFC 3339 timestamp. Kept as text so a damaged value survives loading
    /// and is dealt with by eviction.
    pub created_at: String,
    pub last_accessed_at: String,
    pub access_count: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<UsageInfo>,
}

impl CacheEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn last_accessed_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_accessed_at)
    }

    /// Record a cache hit.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed_at = format_timestamp(now);
        self.access_count += 1;
    }
}

/// Statistics for cache operations.
///
/// Only `total_hits` and `total_misses` (and `hit_rate`, derived from them)
/// carry state between runs; the other fields are recomputed by
/// [`CacheManager::stats`](crate::cache::CacheManager::stats).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    pub hit_rate: f64,
    pub total_cost_saved: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<String>,
    pub cache_size_bytes: u64,
}

impl CacheStats {
    pub(crate) fn record_hit(&mut self) {
        self.total_hits += 1;
        self.update_hit_rate();
    }

    pub(crate) fn record_miss(&mut self) {
        self.total_misses += 1;
        self.update_hit_rate();
    }

    fn update_hit_rate(&mut self) {
        let total = self.total_hits + self.total_misses;
        if total > 0 {
            self.hit_rate = self.total_hits as f64 / total as f64;
        }
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    1000
}

fn default_max_age_days() -> u32 {
    30
}

fn default_cleanup_interval_hours() -> u32 {
    24
}

fn default_cache_file_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("commit-msg")
        .join("cache.json")
}
