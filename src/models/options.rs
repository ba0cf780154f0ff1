// Generation options that take part in the cache key
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};

/// Controls how a commit message is produced by the LLM backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Optional tone/style guidance appended to the base prompt.
    #[serde(default)]
    pub style_instruction: String,

    /// 1-indexed attempt number. Anything above 1 asks the backend for an
    /// alternative to a previous output.
    #[serde(default = "default_attempt")]
    pub attempt: u32,
}

impl GenerationOptions {
    pub fn new(style_instruction: impl Into<String>, attempt: u32) -> Self {
        Self {
            style_instruction: style_instruction.into(),
            attempt,
        }
    }

    /// First-shot options with a style instruction.
    pub fn with_style(style_instruction: impl Into<String>) -> Self {
        Self::new(style_instruction, 1)
    }

    /// Only first attempts are worth caching; a regeneration is explicitly
    /// asking for something different.
    pub fn is_cacheable(&self) -> bool {
        self.attempt <= 1
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            style_instruction: String::new(),
            attempt: default_attempt(),
        }
    }
}

fn default_attempt() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cacheable_attempts() {
        assert!(GenerationOptions::default().is_cacheable());
        assert!(GenerationOptions::new("", 0).is_cacheable());
        assert!(!GenerationOptions::new("casual", 2).is_cacheable());
    }
}
