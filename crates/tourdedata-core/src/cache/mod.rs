//! Persistent memoization for fetch and enrichment operations.
//!
//! `Cache::call(namespace, &args, compute)` runs `compute` once per
//! distinct argument tuple and serves every later call from the store,
//! across process runs. Each operation gets its own partition (namespace).
//!
//! Backends:
//! - `DiskStore`: one JSON file per entry under `<cache_dir>/<namespace>/`
//! - `MemoryStore`: in-process, for tests

pub mod manager;
pub mod store;

pub use manager::{age_display, Cache, CachedData};
pub use store::{CacheStore, DiskStore, MemoryStore, PartitionStats};
