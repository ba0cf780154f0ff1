//! Data models shared between the cache and its callers.
//!
//! This module contains the request-side types the cache keys on:
//! - The closed set of LLM backends (`provider`)
//! - Per-request generation options (`options`)
//! - Token usage reporting and cost estimation (`usage`)

// Author: kelexine (https://github.com/kelexine)

pub mod options;
pub mod provider;
pub mod usage;

pub use options::GenerationOptions;
pub use provider::LlmProvider;
pub use usage::{estimate_tokens, UsageInfo};
