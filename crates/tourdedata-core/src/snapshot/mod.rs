//! Year-by-year assembly of the JSON snapshots.
//!
//! Each snapshot walks its year range (or race list) strictly in order,
//! pulling enriched records through the [`Enricher`]. Failures are handled
//! at two levels:
//!
//! - a listing (the ranking for a whole year or race) that fails skips that
//!   year and is recorded in the [`AssemblyReport`], or aborts the run when
//!   `fail_fast` is set
//! - a single nation, team or rider that fails is logged, left out and
//!   counted

mod insights;
mod nations;
mod peloton;
mod races;

use std::fmt;
use std::future::Future;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::country::CountryLookup;
use crate::enrich::Enricher;
use crate::fetch::Fetcher;

pub use insights::{InsightsSnapshot, TeamDiversity, TeamInfo};
pub use nations::{NationEntry, NationsSnapshot};
pub use peloton::{AgeRankings, NationRankings, PelotonSnapshot, WinnerRankings};
pub use races::RacesSnapshot;

/// A listing that could not be fetched; the whole year (or race) is missing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedListing {
    pub section: String,
    /// Season or race id
    pub key: String,
    pub error: String,
}

/// A single entity left out of an otherwise complete year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub kind: String,
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub failed: Vec<FailedListing>,
    pub skipped: Vec<SkippedEntity>,
}

impl AssemblyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, section: &str, key: impl fmt::Display, error: &anyhow::Error) {
        self.failed.push(FailedListing {
            section: section.to_string(),
            key: key.to_string(),
            error: format!("{:#}", error),
        });
    }

    pub fn record_skip(&mut self, kind: &str, id: &str, error: &anyhow::Error) {
        self.skipped.push(SkippedEntity {
            kind: kind.to_string(),
            id: id.to_string(),
            error: format!("{:#}", error),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Log one line per failed listing and a summary
    pub fn log_summary(&self) {
        for failure in &self.failed {
            warn!(section = %failure.section, key = %failure.key, error = %failure.error, "Listing missing from snapshot");
        }
        if self.is_clean() {
            info!("Snapshot complete");
        } else {
            warn!(
                failed_listings = self.failed.len(),
                skipped_entities = self.skipped.len(),
                "Snapshot incomplete"
            );
        }
    }
}

/// Builds snapshots from enriched records
pub struct SnapshotAssembler<'a, F, L> {
    enricher: Enricher<'a, F, L>,
    fail_fast: bool,
}

impl<'a, F: Fetcher, L: CountryLookup> SnapshotAssembler<'a, F, L> {
    pub fn new(enricher: Enricher<'a, F, L>) -> Self {
        Self {
            enricher,
            fail_fast: false,
        }
    }

    /// Abort on the first failed listing instead of skipping it
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn enricher(&self) -> &Enricher<'a, F, L> {
        &self.enricher
    }

    /// Await a listing. On failure either propagate (fail fast) or record
    /// it and return None so the caller skips the year.
    async fn listing<T>(
        &self,
        report: &mut AssemblyReport,
        section: &str,
        key: impl fmt::Display,
        fetch: impl Future<Output = Result<T>>,
    ) -> Result<Option<T>> {
        match fetch.await {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.fail_fast => Err(e.context(format!("{} listing for {} failed", section, key))),
            Err(e) => {
                warn!(section, key = %key, error = %e, "Listing failed, skipping");
                report.record_failure(section, key, &e);
                Ok(None)
            }
        }
    }

    /// Await a single entity. Failures are logged and recorded, never propagated.
    async fn entity<T>(
        &self,
        report: &mut AssemblyReport,
        kind: &str,
        id: &str,
        fetch: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        match fetch.await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(kind, id, error = %e, "Skipping entity");
                report.record_skip(kind, id, &e);
                None
            }
        }
    }
}
