// Cache command implementations
// Author: kelexine (https://github.com/kelexine)

use crate::cache::{generate_cache_key, CacheManager};
use crate::cli::RequestArgs;
use crate::error::{CacheError, Result};
use crate::models::UsageInfo;
use crate::utils::format::{format_bytes, format_timestamp};
use std::fs;
use std::io::{BufRead, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Read the diff from a file, or from `stdin` when no path is given.
pub fn read_diff(path: Option<&Path>, stdin: &mut impl Read) -> Result<String> {
    let diff = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        }
    };

    if diff.trim().is_empty() {
        return Err(CacheError::InvalidInput("diff is empty".to_string()));
    }
    Ok(diff)
}

/// Print the cache statistics table.
pub fn show_stats(cache: &CacheManager, out: &mut impl Write) -> Result<()> {
    let stats = cache.stats();

    writeln!(out, "Commit Message Cache Statistics")?;
    writeln!(out)?;
    writeln!(out, "  {:<18}{}", "Cache File", cache.file_path().display())?;
    writeln!(out, "  {:<18}{}", "Total Entries", stats.total_entries)?;
    writeln!(out, "  {:<18}{}", "Cache Hits", stats.total_hits)?;
    writeln!(out, "  {:<18}{}", "Cache Misses", stats.total_misses)?;
    writeln!(out, "  {:<18}{:.2}%", "Hit Rate", stats.hit_rate * 100.0)?;
    writeln!(out, "  {:<18}${:.4}", "Total Cost Saved", stats.total_cost_saved)?;
    writeln!(out, "  {:<18}{}", "Cache Size", format_bytes(stats.cache_size_bytes))?;
    if let Some(oldest) = &stats.oldest_entry {
        writeln!(out, "  {:<18}{}", "Oldest Entry", format_timestamp(oldest))?;
    }
    if let Some(newest) = &stats.newest_entry {
        writeln!(out, "  {:<18}{}", "Newest Entry", format_timestamp(newest))?;
    }
    writeln!(out)?;

    if stats.total_entries == 0 {
        writeln!(
            out,
            "Cache is empty. Generate some commit messages to start building the cache."
        )?;
    } else {
        writeln!(out, "Cache is active with {} entries", stats.total_entries)?;
    }

    Ok(())
}

/// Clear the cache, asking for confirmation on `input` unless `confirmed`.
pub fn clear_cache(
    cache: &CacheManager,
    confirmed: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let stats = cache.stats();

    if stats.total_entries == 0 {
        // Still drop any stale file and counters
        cache.clear()?;
        writeln!(out, "Cache is already empty.")?;
        return Ok(());
    }

    if !confirmed {
        write!(
            out,
            "Are you sure you want to clear {} cached entries? This action cannot be undone. [y/N] ",
            stats.total_entries
        )?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "Cache clear cancelled.")?;
            return Ok(());
        }
    }

    cache.clear()?;
    info!("Cleared {} cache entries", stats.total_entries);
    writeln!(out, "Cache cleared successfully!")?;
    writeln!(
        out,
        "Removed {} entries worth ${:.4} in saved API costs",
        stats.total_entries, stats.total_cost_saved
    )?;
    Ok(())
}

/// Run eviction and report what was removed.
pub fn cleanup_cache(cache: &CacheManager, out: &mut impl Write) -> Result<()> {
    if cache.is_empty() {
        writeln!(out, "Cache is empty. Nothing to cleanup.")?;
        return Ok(());
    }

    let report = cache.cleanup()?;
    if report.total() > 0 {
        writeln!(
            out,
            "Cleanup completed! Removed {} entries ({} expired, {} least recently used).",
            report.total(),
            report.expired,
            report.evicted_lru
        )?;
        writeln!(out, "Cache now contains {} entries", cache.len())?;
    } else {
        writeln!(out, "No old entries found to remove.")?;
    }
    Ok(())
}

/// Print the cache key a request maps to.
pub fn print_key(request: &RequestArgs, diff: &str, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{}",
        generate_cache_key(request.provider, diff, &request.options())
    )?;
    Ok(())
}

/// Print the cached message for a request. Returns whether it was a hit.
pub fn get_cached(
    cache: &CacheManager,
    request: &RequestArgs,
    diff: &str,
    out: &mut impl Write,
) -> Result<bool> {
    let hit = cache.get(request.provider, diff, &request.options());
    if let Some(entry) = &hit {
        writeln!(out, "{}", entry.message)?;
    }

    // Counters changed either way; losing them only costs durability
    if let Err(e) = cache.flush() {
        warn!("Failed to save cache counters: {}", e);
    }

    Ok(hit.is_some())
}

/// Store a generated message, estimating usage and cost when not supplied.
pub fn put_cached(
    cache: &CacheManager,
    request: &RequestArgs,
    diff: &str,
    message: &str,
    cost: Option<f64>,
    out: &mut impl Write,
) -> Result<()> {
    let options = request.options();
    if !options.is_cacheable() {
        writeln!(
            out,
            "Attempt {} is a regeneration; only first attempts are cached.",
            options.attempt
        )?;
        return Ok(());
    }

    if message.trim().is_empty() {
        return Err(CacheError::InvalidInput("message is empty".to_string()));
    }

    let usage = UsageInfo::estimate(diff, message);
    let cost = cost.unwrap_or_else(|| {
        request
            .provider
            .estimate_cost(usage.prompt_tokens, usage.completion_tokens)
    });

    cache.set(request.provider, diff, &options, message, cost, Some(usage))?;
    if request.provider.is_local() && cost == 0.0 {
        writeln!(out, "Cached message for {} (local backend, no cost)", request.provider)?;
    } else {
        writeln!(out, "Cached message for {} (cost ${:.4})", request.provider, cost)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::models::LlmProvider;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn request(attempt: u32) -> RequestArgs {
        RequestArgs {
            provider: LlmProvider::Gemini,
            style: String::new(),
            attempt,
            diff: None,
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_read_diff_rejects_blank_input() {
        let mut stdin = Cursor::new("   \n");
        assert!(matches!(
            read_diff(None, &mut stdin),
            Err(CacheError::InvalidInput(_))
        ));

        let mut stdin = Cursor::new("+added\n");
        assert_eq!(read_diff(None, &mut stdin).unwrap(), "+added\n");
    }

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")));

        let mut out = Vec::new();
        put_cached(&cache, &request(1), "+fn main() {}", "feat: add main", None, &mut out).unwrap();
        assert!(output(out).contains("Cached message for Gemini"));

        let mut out = Vec::new();
        assert!(get_cached(&cache, &request(1), "+fn main() {}", &mut out).unwrap());
        assert_eq!(output(out), "feat: add main\n");

        let mut out = Vec::new();
        assert!(!get_cached(&cache, &request(2), "+fn main() {}", &mut out).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn test_get_prints_hit_when_save_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = CacheManager::new(CacheConfig::with_file(&path));
        put_cached(&cache, &request(1), "+x", "fix: x", None, &mut std::io::sink()).unwrap();

        // A directory where the cache file should be makes every write fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let mut out = Vec::new();
        assert!(get_cached(&cache, &request(1), "+x", &mut out).unwrap());
        assert_eq!(output(out), "fix: x\n");
        assert_eq!(cache.stats().total_hits, 1);
    }

    #[test]
    fn test_put_local_backend_reports_no_cost() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")));
        let local = RequestArgs {
            provider: LlmProvider::Ollama,
            ..request(1)
        };

        let mut out = Vec::new();
        put_cached(&cache, &local, "+fn main() {}", "feat: add main", None, &mut out).unwrap();
        assert!(output(out).contains("Cached message for Ollama (local backend, no cost)"));
        assert_eq!(cache.stats().total_cost_saved, 0.0);
    }

    #[test]
    fn test_put_skips_regenerations() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")));

        let mut out = Vec::new();
        put_cached(&cache, &request(3), "+x", "chore: x", Some(0.01), &mut out).unwrap();

        assert!(cache.is_empty());
        assert!(output(out).contains("only first attempts are cached"));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")));
        put_cached(&cache, &request(1), "+x", "chore: x", Some(0.01), &mut std::io::sink()).unwrap();

        let mut out = Vec::new();
        clear_cache(&cache, false, &mut Cursor::new("n\n"), &mut out).unwrap();
        assert!(output(out).contains("cancelled"));
        assert_eq!(cache.len(), 1);

        let mut out = Vec::new();
        clear_cache(&cache, false, &mut Cursor::new("yes\n"), &mut out).unwrap();
        assert!(output(out).contains("Removed 1 entries"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_report() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(CacheConfig::with_file(dir.path().join("cache.json")));

        let mut out = Vec::new();
        show_stats(&cache, &mut out).unwrap();
        assert!(output(out).contains("Cache is empty"));

        put_cached(&cache, &request(1), "+x", "chore: x", Some(0.25), &mut std::io::sink()).unwrap();
        let mut out = Vec::new();
        show_stats(&cache, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("$0.2500"));
        assert!(text.contains("Cache is active with 1 entries"));
        assert!(text.contains("Oldest Entry"));
    }
}
