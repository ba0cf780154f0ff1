// Cache file persistence
// Author: kelexine (https://github.com/kelexine)
//
// The whole cache lives in one JSON document that is rewritten on every
// flush. There is no write-ahead log; a torn write leaves an unreadable file,
// which the loader treats the same as a missing one.

use crate::cache::models::{CacheConfig, CacheEntry, CacheStats};
use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// On-disk layout of the cache file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheFile {
    #[serde(default)]
    pub entries: HashMap<String, CacheEntry>,
    #[serde(default)]
    pub stats: CacheStats,
    /// Configuration active when the file was written. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CacheConfig>,
}

/// Borrowed view used for writing, so a flush does not clone the map.
#[derive(Serialize)]
struct CacheFileRef<'a> {
    entries: &'a HashMap<String, CacheEntry>,
    stats: &'a CacheStats,
    config: &'a CacheConfig,
}

/// Read the cache file. A missing file yields `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<CacheFile>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No cache file at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(CacheError::Io(e)),
    };

    let mut file: CacheFile = serde_json::from_str(&data)?;
    file.stats.total_entries = file.entries.len();

    debug!(
        "Loaded {} cache entries from {}",
        file.entries.len(),
        path.display()
    );
    Ok(Some(file))
}

/// Write the full cache to `path`, creating its directory if needed.
pub fn save(
    path: &Path,
    entries: &HashMap<String, CacheEntry>,
    stats: &CacheStats,
    config: &CacheConfig,
) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| CacheError::persistence(dir, e))?;
    }

    let data = serde_json::to_string_pretty(&CacheFileRef {
        entries,
        stats,
        config,
    })?;

    fs::write(path, data).map_err(|e| CacheError::persistence(path, e))?;
    debug!("Saved {} cache entries to {}", entries.len(), path.display());
    Ok(())
}

/// Delete the cache file. An already missing file is not an error.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::persistence(path, e)),
    }
}

/// Size of the cache file in bytes, 0 if it does not exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
