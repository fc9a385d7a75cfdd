use anyhow::{Context, Result};

use super::namespaces as ns;
use super::Enricher;
use crate::country::CountryLookup;
use crate::fetch::{Fetcher, RankingQuery, RankingRow};
use crate::models::{TeamAge, TeamEquipment, TeamRecord, TeamWins};

impl<F: Fetcher, L: CountryLookup> Enricher<'_, F, L> {
    /// WorldTour team urls of a season
    pub async fn team_urls(&self, year: i32) -> Result<Vec<String>> {
        let fetcher = self.fetcher;
        self.cache
            .call(ns::TEAMS, &(year,), || async move {
                fetcher
                    .fetch_teams(year)
                    .await
                    .with_context(|| format!("Failed to fetch teams for {}", year))
            })
            .await
    }

    pub async fn team(&self, team_url: &str) -> Result<TeamRecord> {
        let fetcher = self.fetcher;
        self.cache
            .call(ns::TEAM, &(team_url,), || async move {
                let raw = fetcher
                    .fetch_team(team_url)
                    .await
                    .with_context(|| format!("Failed to fetch team {}", team_url))?;
                Ok(TeamRecord::from(raw))
            })
            .await
    }

    pub async fn team_average_ages(&self, year: i32) -> Result<Vec<TeamAge>> {
        let query = RankingQuery::TeamAverageAge { year };
        self.cached_rows(ns::AVERAGE_AGE, year, &query, TeamAge::from_row)
            .await
    }

    pub async fn team_equipment(&self, year: i32) -> Result<Vec<TeamEquipment>> {
        let query = RankingQuery::TeamEquipment { year };
        self.cached_rows(ns::TEAM_EQUIPMENT, year, &query, TeamEquipment::from_row)
            .await
    }

    pub async fn team_wins(&self, year: i32) -> Result<Vec<TeamWins>> {
        let query = RankingQuery::TeamWins { year };
        self.cached_rows(ns::TEAM_WINS, year, &query, TeamWins::from_row)
            .await
    }

    /// Ranking rows of a season mapped one-to-one into records; rows the
    /// mapper rejects are dropped
    pub(super) async fn cached_rows<T>(
        &self,
        namespace: &str,
        year: i32,
        query: &RankingQuery,
        map: fn(&RankingRow) -> Option<T>,
    ) -> Result<Vec<T>>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let fetcher = self.fetcher;
        self.cache
            .call(namespace, &(year,), || async move {
                let rows = fetcher
                    .fetch_ranking(query)
                    .await
                    .with_context(|| format!("Failed to fetch {} for {}", namespace, year))?;
                Ok(rows.iter().filter_map(map).collect())
            })
            .await
    }
}
