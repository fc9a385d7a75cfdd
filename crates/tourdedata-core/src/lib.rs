//! Core library for Tour de Data.
//!
//! Assembles cycling statistics (nations, teams, riders, races) from
//! procyclingstats.com into nested JSON snapshots for the front end.
//!
//! - `fetch`: the `Fetcher` trait and the HTTP-backed `PcsClient`
//! - `country`: country name to ISO code conversion
//! - `cache`: persistent memoization keyed by operation and arguments
//! - `enrich`: per-entity enrichment (age, country codes, name ordering)
//! - `snapshot`: year-by-year assembly with partial-failure tolerance

pub mod cache;
pub mod config;
pub mod country;
pub mod enrich;
pub mod fetch;
pub mod models;
pub mod snapshot;
pub mod utils;

pub use cache::{Cache, CacheStore, DiskStore, MemoryStore};
pub use config::{Config, YearRange};
pub use country::{CodeSpace, CountryLookup, CountryTable};
pub use enrich::Enricher;
pub use fetch::{FetchError, Fetcher, PcsClient, RankingQuery};
pub use snapshot::{AssemblyReport, SnapshotAssembler};
