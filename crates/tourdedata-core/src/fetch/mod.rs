//! Data source layer.
//!
//! The rest of the crate only sees the [`Fetcher`] trait; [`PcsClient`] is
//! the implementation that reads procyclingstats.com. Fetchers return raw
//! records and do no enrichment or caching of their own.

pub mod client;
pub mod error;
pub mod html;
pub mod query;
#[cfg(test)]
pub(crate) mod stub;
pub mod types;

pub use client::PcsClient;
pub use error::FetchError;
pub use query::RankingQuery;
pub use types::{Cell, RankingRow, RawNation, RawRider, RawTeam, SeasonPoints, SeasonTeam};

/// Source of raw entity records.
///
/// Calls are awaited one at a time by the aggregation layer; implementations
/// need not be safe for concurrent use.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Rows of a ranking/listing page. An empty listing is not an error.
    async fn fetch_ranking(&self, query: &RankingQuery) -> Result<Vec<RankingRow>, FetchError>;

    /// Teams, contract riders, wins and points of a nation for one season
    async fn fetch_nation(&self, year: i32, nation_url: &str) -> Result<RawNation, FetchError>;

    /// WorldTour team urls for a season
    async fn fetch_teams(&self, year: i32) -> Result<Vec<String>, FetchError>;

    async fn fetch_team(&self, team_url: &str) -> Result<RawTeam, FetchError>;

    async fn fetch_rider(&self, rider_url: &str) -> Result<RawRider, FetchError>;

    /// Distance and average speed of every edition of a race
    async fn fetch_race_stats(&self, race_id: &str) -> Result<Vec<RankingRow>, FetchError>;
}
