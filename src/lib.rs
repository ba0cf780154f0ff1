// commit-msg - LLM commit message generation with a local response cache
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;
