//! Utility functions and helpers for commit-msg.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization.
//! - `format`: Human-readable rendering of sizes and timestamps.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod format;
pub mod logging;
