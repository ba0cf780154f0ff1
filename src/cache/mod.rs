// Cache management module
// Author: kelexine (https://github.com/kelexine)

pub mod eviction;
pub mod hasher;
pub mod manager;
pub mod models;
pub mod persistence;

pub use eviction::{EvictionReport, EvictionTrigger};
pub use hasher::{generate_cache_key, generate_hash};
pub use manager::CacheManager;
pub use models::{CacheConfig, CacheEntry, CacheStats};
