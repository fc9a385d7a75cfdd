use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::namespaces as ns;
use super::Enricher;
use crate::country::{CodeSpace, CountryLookup};
use crate::fetch::error::is_permanent;
use crate::fetch::{Fetcher, RankingQuery};
use crate::models::{ContractRider, RiderAge, RiderProfile, RiderWins, SeasonRider, YoungestRider};
use crate::utils::{canonical_rider_name, parse_birthdate, season_age};

impl<F: Fetcher, L: CountryLookup> Enricher<'_, F, L> {
    /// Season-independent profile of a rider
    pub async fn rider(&self, rider_url: &str) -> Result<RiderProfile> {
        let fetcher = self.fetcher;
        let rider_url = rider_url.trim();
        self.cache
            .call(ns::RIDER, &(rider_url,), || async move {
                let raw = fetcher
                    .fetch_rider(rider_url)
                    .await
                    .with_context(|| format!("Failed to fetch rider {}", rider_url))?;

                let birthdate = raw
                    .birthdate
                    .as_deref()
                    .and_then(parse_birthdate)
                    .map(|d| d.format("%Y-%m-%d").to_string());
                if birthdate.is_none() {
                    debug!(rider = rider_url, raw = ?raw.birthdate, "Rider has no usable birthdate");
                }
                Ok(RiderProfile::from_raw(raw, birthdate))
            })
            .await
    }

    /// Profile plus the fields that depend on a season.
    ///
    /// Without a season, age and team are null.
    pub async fn rider_in_season(&self, rider_url: &str, season: Option<i32>) -> Result<SeasonRider> {
        let profile = self.rider(rider_url).await?;
        Ok(self.season_view(rider_url.trim(), profile, season))
    }

    fn season_view(&self, url: &str, profile: RiderProfile, season: Option<i32>) -> SeasonRider {
        let age = season.and_then(|s| {
            profile
                .birthdate
                .as_deref()
                .and_then(parse_birthdate)
                .and_then(|b| season_age(b, s))
        });
        let team = season.and_then(|s| profile.teams_history.get(&s.to_string()).cloned());
        let nationality_name = profile
            .nationality
            .as_deref()
            .map(|n| self.countries.convert_or_name(n, CodeSpace::ShortName));

        SeasonRider {
            url: url.to_string(),
            profile,
            season,
            age,
            team,
            nationality_name,
            wins: 0,
        }
    }

    pub async fn youngest_riders(&self, year: i32) -> Result<Vec<YoungestRider>> {
        let query = RankingQuery::YoungestRiders { year };
        self.cached_rows(ns::YOUNGEST_AGE, year, &query, YoungestRider::from_row)
            .await
    }

    /// Top three of the WorldTour wins ranking, with picture and country name.
    ///
    /// A rider page that is missing or unreadable leaves picture and
    /// nationality null. Other failures fail the whole call so nothing is
    /// cached.
    pub async fn wins_top3(&self, year: i32) -> Result<Vec<RiderWins>> {
        self.cache
            .call(ns::WINS_RANKING_TOP3, &(year,), || async move {
                let rows = self
                    .fetcher
                    .fetch_ranking(&RankingQuery::RiderWins { year })
                    .await
                    .with_context(|| format!("Failed to fetch wins ranking for {}", year))?;

                let mut top: Vec<RiderWins> =
                    rows.iter().filter_map(RiderWins::from_row).take(3).collect();
                for entry in &mut top {
                    let Some(url) = entry.rider_url.clone() else {
                        continue;
                    };
                    match self.rider(&url).await {
                        Ok(profile) => {
                            entry.picture = profile.image_url;
                            entry.nationality = profile
                                .nationality
                                .map(|n| self.countries.convert_or_name(&n, CodeSpace::ShortName));
                        }
                        Err(e) if is_permanent(&e) => {
                            warn!(year, rider = %url, error = %e, "Top rider page unavailable");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(top)
            })
            .await
    }

    /// WorldTour wins per rider, keyed by canonical name
    pub async fn wins_by_rider(&self, year: i32) -> Result<BTreeMap<String, u32>> {
        let fetcher = self.fetcher;
        self.cache
            .call(ns::WINS_RANKING, &(year,), || async move {
                let rows = fetcher
                    .fetch_ranking(&RankingQuery::RiderWins { year })
                    .await
                    .with_context(|| format!("Failed to fetch wins ranking for {}", year))?;

                let mut wins = BTreeMap::new();
                for rider in rows.iter().filter_map(RiderWins::from_row) {
                    let key = canonical_rider_name(&rider.rider_name);
                    if key.is_empty() {
                        continue;
                    }
                    *wins.entry(key).or_insert(0) += rider.number_of_wins;
                }
                Ok(wins)
            })
            .await
    }

    /// Riders under WorldTour contract for a nation, by nation name
    pub async fn contract_riders(&self, year: i32, nation: &str) -> Result<Vec<ContractRider>> {
        let (fetcher, countries) = (self.fetcher, self.countries);
        self.cache
            .call(ns::CONTRACT_RIDERS, &(year, nation), || async move {
                let country = countries.convert_or_name(nation, CodeSpace::Iso2);
                let rows = fetcher
                    .fetch_ranking(&RankingQuery::ContractRiders { year, country })
                    .await
                    .with_context(|| format!("Failed to fetch contract riders of {} for {}", nation, year))?;
                Ok(rows.iter().filter_map(ContractRider::from_row).collect())
            })
            .await
    }

    /// Age in `year` of every contract rider of a nation.
    ///
    /// Riders whose page is missing or whose birthdate is unknown are left
    /// out. Other failures fail the whole call.
    pub async fn nation_rider_ages(&self, year: i32, nation: &str) -> Result<Vec<RiderAge>> {
        self.cache
            .call(ns::NATION_RIDERS, &(year, nation), || async move {
                let contracts = self.contract_riders(year, nation).await?;

                let mut ages = Vec::new();
                for url in contracts.iter().filter_map(|c| c.rider_url.as_deref()) {
                    let profile = match self.rider(url).await {
                        Ok(profile) => profile,
                        Err(e) if is_permanent(&e) => {
                            warn!(year, nation, rider = url, error = %e, "Skipping rider");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    let age = profile
                        .birthdate
                        .as_deref()
                        .and_then(parse_birthdate)
                        .and_then(|b| season_age(b, year));
                    if let Some(age) = age {
                        ages.push(RiderAge {
                            name: profile.name,
                            age,
                            nationality: profile.nationality,
                        });
                    }
                }
                Ok(ages)
            })
            .await
    }
}
