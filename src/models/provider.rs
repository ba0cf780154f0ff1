// LLM provider catalogue and pricing
// Author: kelexine (https://github.com/kelexine)

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The LLM backends a commit message can be generated with.
///
/// The serialized form doubles as the namespace prefix of every cache key,
/// so renaming a variant invalidates all entries stored under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LlmProvider {
    OpenAI,
    Claude,
    Gemini,
    Grok,
    Groq,
    Ollama,
}

/// Pricing per 1M tokens in USD: (input, output)
const PRICING: [(LlmProvider, f64, f64); 6] = [
    (LlmProvider::OpenAI, 2.50, 10.00),
    (LlmProvider::Claude, 3.00, 15.00),
    (LlmProvider::Gemini, 0.15, 0.60),
    (LlmProvider::Grok, 5.00, 15.00),
    (LlmProvider::Groq, 2.50, 10.00),
    (LlmProvider::Ollama, 0.0, 0.0),
];

impl LlmProvider {
    /// All supported providers, in menu order.
    pub const ALL: [LlmProvider; 6] = [
        LlmProvider::OpenAI,
        LlmProvider::Claude,
        LlmProvider::Gemini,
        LlmProvider::Grok,
        LlmProvider::Groq,
        LlmProvider::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Claude => "Claude",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::Grok => "Grok",
            LlmProvider::Groq => "Groq",
            LlmProvider::Ollama => "Ollama",
        }
    }

    /// Whether the backend runs on the local machine (no per-token billing).
    pub fn is_local(&self) -> bool {
        matches!(self, LlmProvider::Ollama)
    }

    /// Estimate the USD cost of a generation from its token counts.
    pub fn estimate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let (input_price, output_price) = PRICING
            .iter()
            .find(|(provider, _, _)| provider == self)
            .map(|(_, input, output)| (*input, *output))
            .unwrap_or((0.0, 0.0));

        f64::from(input_tokens) * input_price / 1_000_000.0
            + f64::from(output_tokens) * output_price / 1_000_000.0
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CacheError::UnknownProvider(format!(
                    "{}. Supported providers: {}",
                    s,
                    Self::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}
