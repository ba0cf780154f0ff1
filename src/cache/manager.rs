// Cache manager - lookup, insertion and bookkeeping for cached commit messages
// Author: kelexine (https://github.com/kelexine)

use crate::cache::eviction::{evict, EvictionReport, EvictionTrigger};
use crate::cache::hasher;
use crate::cache::models::{format_timestamp, CacheConfig, CacheEntry, CacheStats};
use crate::cache::persistence;
use crate::error::Result;
use crate::models::{GenerationOptions, LlmProvider, UsageInfo};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Mutable cache state, guarded as a unit.
#[derive(Default)]
struct CacheState {
    /// Cache key → entry
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// File-backed cache of generated commit messages.
///
/// Construct one per process and share it by reference (or `Arc`). Every
/// mutating call rewrites the whole cache file.
pub struct CacheManager {
    config: CacheConfig,
    state: RwLock<CacheState>,
}

impl CacheManager {
    /// Create a cache manager, loading any existing cache file.
    ///
    /// Loading is best effort: a missing file starts an empty cache, and an
    /// unreadable one is logged and replaced by an empty cache on the next
    /// flush. Message generation must never be blocked by a broken cache.
    pub fn new(config: CacheConfig) -> Self {
        let state = match persistence::load(&config.cache_file_path) {
            Ok(Some(file)) => CacheState {
                entries: file.entries,
                stats: file.stats,
            },
            Ok(None) => CacheState::default(),
            Err(e) => {
                warn!(
                    "Failed to load cache from {}, starting empty: {}",
                    config.cache_file_path.display(),
                    e
                );
                CacheState::default()
            }
        };

        Self {
            config,
            state: RwLock::new(state),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn file_path(&self) -> &Path {
        &self.config.cache_file_path
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a cached message.
    ///
    /// Hits and misses both update the counters; a hit also refreshes the
    /// entry's access time and count.
    pub fn get(
        &self,
        provider: LlmProvider,
        diff: &str,
        options: &GenerationOptions,
    ) -> Option<CacheEntry> {
        if !self.config.enabled {
            debug!("Caching disabled");
            return None;
        }

        let key = hasher::generate_cache_key(provider, diff, options);
        let mut state = self.state.write();

        let Some(entry) = state.entries.get_mut(&key) else {
            debug!("Cache miss for key: {}", short_key(&key));
            state.stats.record_miss();
            return None;
        };

        entry.touch(Utc::now());
        let found = entry.clone();
        state.stats.record_hit();

        debug!(
            "Cache hit for key: {} (accessed {} times)",
            short_key(&key),
            found.access_count
        );
        Some(found)
    }

    /// Store a generated message and flush the cache to disk.
    ///
    /// Callers should only store first attempts (see
    /// [`GenerationOptions::is_cacheable`]). The entry stays in memory even
    /// when the flush fails.
    pub fn set(
        &self,
        provider: LlmProvider,
        diff: &str,
        options: &GenerationOptions,
        message: &str,
        cost: f64,
        tokens: Option<UsageInfo>,
    ) -> Result<()> {
        if !self.config.enabled {
            debug!("Caching disabled, not storing message");
            return Ok(());
        }

        let diff_hash = hasher::generate_hash(diff, options);
        let key = format!("{}:{}", provider, diff_hash);
        let now = format_timestamp(Utc::now());

        let entry = CacheEntry {
            message: message.to_string(),
            provider,
            diff_hash,
            style_instruction: options.style_instruction.clone(),
            attempt: options.attempt,
            created_at: now.clone(),
            last_accessed_at: now,
            access_count: 1,
            cost,
            tokens,
        };

        let mut state = self.state.write();
        state.entries.insert(key.clone(), entry);
        state.stats.total_entries = state.entries.len();
        debug!("Cached message under key: {}", short_key(&key));

        if state.entries.len() > self.config.max_entries {
            self.run_eviction(&mut state, EvictionTrigger::Capacity);
        }

        self.persist(&state)
    }

    /// Remove every entry, reset the counters and delete the cache file.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        state.entries.clear();
        state.stats = CacheStats::default();

        persistence::remove(&self.config.cache_file_path)?;
        debug!("Cache cleared");
        Ok(())
    }

    /// Run eviction on demand and flush the result. Runs whether or not the
    /// cache is enabled, so a disabled cache can still be maintained.
    pub fn cleanup(&self) -> Result<EvictionReport> {
        let mut state = self.state.write();
        let report = self.run_eviction(&mut state, EvictionTrigger::Explicit);
        self.persist(&state)?;
        Ok(report)
    }

    /// Write the current entries and counters to disk.
    ///
    /// `get` never touches the file on its own; short-lived callers use this
    /// to keep hit/miss counters across runs. Like `cleanup`, it writes even
    /// when the cache is disabled.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.read();
        self.persist(&state)
    }

    /// Snapshot of the cache statistics with derived fields recomputed.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        let mut stats = state.stats.clone();

        stats.total_entries = state.entries.len();
        stats.total_cost_saved = state.entries.values().map(|e| e.cost).sum();

        // Unparsable timestamps are skipped here rather than reported
        let mut dated: Vec<_> = state
            .entries
            .values()
            .filter_map(|e| e.created_at().map(|at| (at, &e.created_at)))
            .collect();
        dated.sort_by_key(|(at, _)| *at);
        stats.oldest_entry = dated.first().map(|(_, raw)| (*raw).clone());
        stats.newest_entry = dated.last().map(|(_, raw)| (*raw).clone());

        stats.cache_size_bytes = if state.entries.is_empty() {
            0
        } else {
            persistence::file_size(&self.config.cache_file_path)
        };

        stats
    }

    fn run_eviction(&self, state: &mut CacheState, trigger: EvictionTrigger) -> EvictionReport {
        let report = evict(&mut state.entries, &self.config, Utc::now(), trigger);
        state.stats.total_entries = state.entries.len();
        report
    }

    fn persist(&self, state: &CacheState) -> Result<()> {
        persistence::save(
            &self.config.cache_file_path,
            &state.entries,
            &state.stats,
            &self.config,
        )
        .inspect_err(|e| warn!("Failed to save cache: {}", e))
    }
}

fn short_key(key: &str) -> &str {
    // Provider prefix plus the first 16 hex characters
    let end = key.find(':').map(|i| i + 17).unwrap_or(16);
    key.get(..end).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> CacheManager {
        CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")))
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = manager(&dir);
        let opts = GenerationOptions::default();

        cache
            .set(LlmProvider::OpenAI, "diff D1", &opts, "feat: add X", 0.002, None)
            .unwrap();

        let entry = cache.get(LlmProvider::OpenAI, "diff D1", &opts).unwrap();
        assert_eq!(entry.message, "feat: add X");
        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.diff_hash, hasher::generate_hash("diff D1", &opts));

        assert!(cache
            .get(LlmProvider::OpenAI, "diff D1", &GenerationOptions::new("", 2))
            .is_none());
    }

    #[test]
    fn test_overwrite_resets_entry() {
        let dir = TempDir::new().unwrap();
        let cache = manager(&dir);
        let opts = GenerationOptions::default();

        cache.set(LlmProvider::Groq, "+a", &opts, "first", 0.1, None).unwrap();
        cache.get(LlmProvider::Groq, "+a", &opts);
        cache.set(LlmProvider::Groq, "+a", &opts, "second", 0.2, None).unwrap();

        let entry = cache.get(LlmProvider::Groq, "+a", &opts).unwrap();
        assert_eq!(entry.message, "second");
        assert_eq!(entry.access_count, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::with_file(dir.path().join("cache.json"))
        };
        let cache = CacheManager::new(config);
        let opts = GenerationOptions::default();

        cache.set(LlmProvider::Claude, "+a", &opts, "msg", 0.0, None).unwrap();
        assert!(cache.get(LlmProvider::Claude, "+a", &opts).is_none());

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_misses, 0);
        assert!(!cache.file_path().exists());
    }

    #[test]
    fn test_disabled_cache_can_still_be_maintained() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::with_file(dir.path().join("cache.json"))
        };
        let cache = CacheManager::new(config);

        cache.flush().unwrap();
        assert!(cache.file_path().exists());

        cache.clear().unwrap();
        assert_eq!(cache.cleanup().unwrap(), EvictionReport::default());
        assert!(cache.file_path().exists());
    }

    #[test]
    fn test_short_key() {
        let key = format!("OpenAI:{}", "a".repeat(64));
        assert_eq!(short_key(&key), format!("OpenAI:{}", "a".repeat(16)));
        assert_eq!(short_key("abc"), "abc");
    }
}
