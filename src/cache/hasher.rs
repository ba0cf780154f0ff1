// Diff fingerprinting - cache key generation
// Author: kelexine (https://github.com/kelexine)

use crate::models::{GenerationOptions, LlmProvider};
use sha2::{Digest, Sha256};

/// Separator between the parts of the hash input.
const INPUT_SEPARATOR: &str = "|";

/// Marker folded into the hash input for first-shot generations only.
const FIRST_ATTEMPT_MARKER: &str = "attempt:1";

/// Headers that describe where a change happened rather than what changed.
const METADATA_PREFIXES: [&str; 5] = ["diff --git", "index ", "+++", "---", "@@"];

/// Generate the SHA256 fingerprint of a diff and its generation options.
///
/// The diff is normalized first (see [`normalize_diff`]), so two diffs that
/// differ only in hunk order, file headers or indentation share a
/// fingerprint.
pub fn generate_hash(diff: &str, options: &GenerationOptions) -> String {
    let normalized = normalize_diff(diff);
    let input = build_hash_input(&normalized, options);

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate the full cache key: the fingerprint namespaced by provider.
pub fn generate_cache_key(provider: LlmProvider, diff: &str, options: &GenerationOptions) -> String {
    format!("{}:{}", provider, generate_hash(diff, options))
}

/// Reduce a diff to its sorted set of semantic lines.
///
/// Sorting trades positional information for stability: git versions and flag
/// combinations that report hunks in a different order still map to the same
/// normalized text.
pub fn normalize_diff(diff: &str) -> String {
    let mut lines: Vec<String> = diff
        .lines()
        .filter(|line| !should_skip_line(line))
        .map(normalize_line)
        .filter(|line| !line.is_empty())
        .collect();

    lines.sort_unstable();
    lines.join("\n")
}

fn should_skip_line(line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }

    if METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return true;
    }

    // Added/removed lines holding a path. This also drops content lines that
    // happen to contain a slash (URLs, fractions, comments).
    is_change_line(line) && line.contains('/')
}

fn normalize_line(line: &str) -> String {
    let line = line.trim();

    if is_change_line(line) {
        let (prefix, content) = line.split_at(1);
        format!("{}{}", prefix, content.trim())
    } else {
        line.to_string()
    }
}

fn is_change_line(line: &str) -> bool {
    line.starts_with('+') || line.starts_with('-')
}

fn build_hash_input(normalized_diff: &str, options: &GenerationOptions) -> String {
    let mut parts = vec![normalized_diff.to_string()];

    let style = options.style_instruction.trim();
    if !style.is_empty() {
        parts.push(format!("style:{}", style));
    }

    if options.is_cacheable() {
        parts.push(FIRST_ATTEMPT_MARKER.to_string());
    }

    parts.join(INPUT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = "diff --git a/file.txt b/file.txt
index 1234567..abcdefg 100644
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@
 line1
-line2
+line2 updated
 line3";

    #[test]
    fn test_normalize_drops_metadata() {
        let normalized = normalize_diff(SAMPLE_DIFF);
        assert_eq!(normalized, "+line2 updated\n-line2\nline1\nline3");
    }

    #[test]
    fn test_normalize_trims_change_content() {
        assert_eq!(normalize_diff("+    let x = 1;   "), "+let x = 1;");
        assert_eq!(normalize_diff("\t-\tfoo()"), "-foo()");
    }

    #[test]
    fn test_path_heuristic_drops_slash_lines() {
        assert_eq!(normalize_diff("+src/main.rs\n+real change"), "+real change");
        // Context lines keep their slashes
        assert_eq!(normalize_diff(" // comment"), "// comment");
    }

    #[test]
    fn test_hash_input_layout() {
        let input = build_hash_input("+a", &GenerationOptions::with_style("  casual  "));
        assert_eq!(input, "+a|style:casual|attempt:1");

        let input = build_hash_input("+a", &GenerationOptions::new("", 3));
        assert_eq!(input, "+a");
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = generate_hash(SAMPLE_DIFF, &GenerationOptions::default());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_cache_key_prefix() {
        let key = generate_cache_key(LlmProvider::Claude, SAMPLE_DIFF, &GenerationOptions::default());
        assert!(key.starts_with("Claude:"));
        assert_eq!(key.len(), "Claude:".len() + 64);
    }
}
