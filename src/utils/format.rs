// Display helpers for cache reports
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::parse_timestamp;

/// Format a byte count with binary units: `512 B`, `1.5 KB`, `3.2 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}

/// Format an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS`, falling back to
/// the raw text when it does not parse.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}
