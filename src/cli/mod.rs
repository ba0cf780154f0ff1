// CLI module for commit-msg
// Author: kelexine (https://github.com/kelexine)

pub mod commands;

use crate::models::{GenerationOptions, LlmProvider};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// commit-msg - LLM commit message generation with a local response cache
#[derive(Parser, Debug)]
#[command(name = "commit-msg", version, about, long_about = None)]
pub struct Args {
    /// Configuration file (default: <config dir>/commit-msg/config.toml)
    #[arg(long, global = true, env = "COMMIT_MSG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the cache file location
    #[arg(long, global = true)]
    pub cache_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and maintain the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Remove every cached message
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove expired and least-recently-used entries
    Cleanup,
    /// Print the cache key for a diff
    Key(RequestArgs),
    /// Print the cached message for a diff (exit status 1 on miss)
    Get(RequestArgs),
    /// Store a generated message for a diff
    Put {
        #[command(flatten)]
        request: RequestArgs,

        /// The generated commit message
        #[arg(short, long)]
        message: String,

        /// Cost of the generation in USD (estimated when omitted)
        #[arg(long)]
        cost: Option<f64>,
    },
}

/// Identifies one generation request.
#[derive(ClapArgs, Debug)]
pub struct RequestArgs {
    /// LLM provider (OpenAI, Claude, Gemini, Grok, Groq, Ollama)
    pub provider: LlmProvider,

    /// Style instruction that was part of the prompt
    #[arg(long, default_value = "")]
    pub style: String,

    /// 1-indexed generation attempt
    #[arg(long, default_value_t = 1)]
    pub attempt: u32,

    /// Read the diff from this file instead of stdin
    #[arg(long)]
    pub diff: Option<PathBuf>,
}

impl RequestArgs {
    pub fn options(&self) -> GenerationOptions {
        GenerationOptions::new(self.style.clone(), self.attempt)
    }
}
