use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{AssemblyReport, SnapshotAssembler};
use crate::config::YearRange;
use crate::country::CountryLookup;
use crate::fetch::Fetcher;
use crate::models::{NationRecord, SeasonRider};
use crate::utils::canonical_rider_name;

/// A nation in one season with its riders resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NationEntry {
    pub name: String,
    pub nationality: String,
    pub ison: String,
    pub teams: Vec<String>,
    pub wins: u32,
    pub pcs_points: u32,
    pub riders: Vec<SeasonRider>,
}

impl NationEntry {
    fn new(record: NationRecord, riders: Vec<SeasonRider>) -> Self {
        Self {
            name: record.name,
            nationality: record.nationality,
            ison: record.ison,
            teams: record.teams,
            wins: record.wins,
            pcs_points: record.pcs_points,
            riders,
        }
    }
}

/// year -> nation name -> entry
pub type NationsSnapshot = BTreeMap<i32, BTreeMap<String, NationEntry>>;

impl<F: Fetcher, L: CountryLookup> SnapshotAssembler<'_, F, L> {
    pub async fn nations(&self, years: YearRange, report: &mut AssemblyReport) -> Result<NationsSnapshot> {
        let mut snapshot = NationsSnapshot::new();

        for year in years.years() {
            info!(year, "Processing nations");
            let Some(urls) = self
                .listing(report, "nations", year, self.enricher.nation_urls(year))
                .await?
            else {
                continue;
            };

            let wins = match self.enricher.wins_by_rider(year).await {
                Ok(wins) => wins,
                Err(e) => {
                    warn!(year, error = %e, "No wins ranking, rider wins default to 0");
                    report.record_skip("wins_ranking", &year.to_string(), &e);
                    BTreeMap::new()
                }
            };

            let mut nations = BTreeMap::new();
            for url in &urls {
                let Some(record) = self
                    .entity(report, "nation", url, self.enricher.nation(year, url))
                    .await
                else {
                    continue;
                };

                let mut riders = Vec::with_capacity(record.rider_urls.len());
                for rider_url in &record.rider_urls {
                    let Some(mut rider) = self
                        .entity(report, "rider", rider_url, self.enricher.rider_in_season(rider_url, Some(year)))
                        .await
                    else {
                        continue;
                    };
                    rider.wins = wins
                        .get(&canonical_rider_name(&rider.profile.name))
                        .copied()
                        .unwrap_or(0);
                    riders.push(rider);
                }

                nations.insert(record.name.clone(), NationEntry::new(record, riders));
            }
            snapshot.insert(year, nations);
        }

        Ok(snapshot)
    }
}
