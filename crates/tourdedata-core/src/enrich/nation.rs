use anyhow::{Context, Result};
use tracing::debug;

use super::namespaces as ns;
use super::Enricher;
use crate::country::{CodeSpace, CountryLookup};
use crate::fetch::{Fetcher, RankingQuery};
use crate::models::{NationRecord, NationStanding};

impl<F: Fetcher, L: CountryLookup> Enricher<'_, F, L> {
    /// Nations ranked by number of WorldTour riders, with ISO numeric codes
    pub async fn nation_standings(&self, year: i32) -> Result<Vec<NationStanding>> {
        let (fetcher, countries) = (self.fetcher, self.countries);
        self.cache
            .call(ns::NATIONS_RANKING, &(year,), || async move {
                let rows = fetcher
                    .fetch_ranking(&RankingQuery::Nations { year })
                    .await
                    .with_context(|| format!("Failed to fetch nations ranking for {}", year))?;

                let standings: Vec<NationStanding> = rows
                    .iter()
                    .filter_map(NationStanding::from_row)
                    .map(|mut standing| {
                        standing.iso_numeric = countries
                            .convert_or_name(&standing.nation_name, CodeSpace::IsoNumeric);
                        standing
                    })
                    .collect();
                debug!(year, nations = standings.len(), "Parsed nations ranking");
                Ok(standings)
            })
            .await
    }

    /// Urls of the ranked nations of a season
    pub async fn nation_urls(&self, year: i32) -> Result<Vec<String>> {
        self.cache
            .call(ns::NATIONS, &(year,), || async move {
                let standings = self.nation_standings(year).await?;
                Ok(standings.into_iter().filter_map(|s| s.nation_url).collect())
            })
            .await
    }

    pub async fn nation(&self, year: i32, nation_url: &str) -> Result<NationRecord> {
        let (fetcher, countries) = (self.fetcher, self.countries);
        self.cache
            .call(ns::NATION, &(year, nation_url), || async move {
                let raw = fetcher
                    .fetch_nation(year, nation_url)
                    .await
                    .with_context(|| format!("Failed to fetch nation {} for {}", nation_url, year))?;

                Ok(NationRecord {
                    nationality: countries.convert_or_name(&raw.name, CodeSpace::Iso2),
                    ison: countries.convert_or_name(&raw.name, CodeSpace::IsoNumeric),
                    name: raw.name,
                    teams: raw.team_urls,
                    rider_urls: raw.rider_urls,
                    wins: raw.wins,
                    pcs_points: raw.pcs_points,
                })
            })
            .await
    }
}
