use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AssemblyReport, SnapshotAssembler};
use crate::country::CountryLookup;
use crate::fetch::Fetcher;
use crate::models::{RaceEdition, RaceWinner};

/// Most-wins lists and edition statistics per race id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RacesSnapshot {
    pub winners: BTreeMap<String, Vec<RaceWinner>>,
    #[serde(rename = "raceInfo")]
    pub race_info: BTreeMap<String, Vec<RaceEdition>>,
}

impl<F: Fetcher, L: CountryLookup> SnapshotAssembler<'_, F, L> {
    pub async fn races(&self, races: &[String], report: &mut AssemblyReport) -> Result<RacesSnapshot> {
        let mut snapshot = RacesSnapshot::default();

        for race in races {
            info!(race = %race, "Processing race");
            if let Some(winners) = self
                .listing(report, "race_winners", race, self.enricher.race_winners(race))
                .await?
            {
                snapshot.winners.insert(race.clone(), winners);
            }
            if let Some(editions) = self
                .listing(report, "race_details", race, self.enricher.race_editions(race))
                .await?
            {
                snapshot.race_info.insert(race.clone(), editions);
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::country::CountryTable;
    use crate::enrich::Enricher;
    use crate::fetch::stub::StubFetcher;
    use crate::fetch::{RankingQuery, RankingRow};

    #[tokio::test]
    async fn test_race_without_rows_is_empty_array() {
        let fetcher = StubFetcher::new()
            .ranking(
                RankingQuery::RaceMostWins { race: "paris-roubaix".into() },
                vec![RankingRow::new()
                    .with("rider", "DE VLAEMINCK Roger")
                    .with("nationality", "Belgium")
                    .with("first_places", "4")],
            )
            .race_stats(
                "paris-roubaix",
                vec![RankingRow::new().with("year", "2024").with("distance", "259.7 km").with("avg_speed", "47.8")],
            )
            .ranking(RankingQuery::RaceMostWins { race: "world-championship".into() }, vec![])
            .race_stats("world-championship", vec![]);
        let cache = Cache::in_memory();
        let assembler = SnapshotAssembler::new(Enricher::new(&fetcher, CountryTable::builtin(), &cache));
        let mut report = AssemblyReport::new();

        let races = vec!["paris-roubaix".to_string(), "world-championship".to_string()];
        let snapshot = assembler.races(&races, &mut report).await.unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["raceInfo"]["world-championship"], serde_json::json!([]));
        assert_eq!(value["winners"]["world-championship"], serde_json::json!([]));
        assert_eq!(value["raceInfo"]["paris-roubaix"][0]["year"], 2024);
        assert_eq!(value["winners"]["paris-roubaix"][0]["nationality"], "056");
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_unknown_race_is_reported() {
        let fetcher = StubFetcher::new();
        let cache = Cache::in_memory();
        let assembler = SnapshotAssembler::new(Enricher::new(&fetcher, CountryTable::builtin(), &cache));
        let mut report = AssemblyReport::new();

        let snapshot = assembler
            .races(&["tour-de-nowhere".to_string()], &mut report)
            .await
            .unwrap();
        assert!(snapshot.winners.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].key, "tour-de-nowhere");
    }
}
