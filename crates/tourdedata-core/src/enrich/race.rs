use anyhow::{Context, Result};

use super::namespaces as ns;
use super::Enricher;
use crate::country::{CodeSpace, CountryLookup};
use crate::fetch::{Fetcher, RankingQuery};
use crate::models::{RaceEdition, RaceWinner};

impl<F: Fetcher, L: CountryLookup> Enricher<'_, F, L> {
    /// Riders with the most wins of a race, nationality as ISO numeric code
    pub async fn race_winners(&self, race: &str) -> Result<Vec<RaceWinner>> {
        let (fetcher, countries) = (self.fetcher, self.countries);
        self.cache
            .call(ns::RACE_WINNERS, &(race,), || async move {
                let query = RankingQuery::RaceMostWins {
                    race: race.to_string(),
                };
                let rows = fetcher
                    .fetch_ranking(&query)
                    .await
                    .with_context(|| format!("Failed to fetch winners of {}", race))?;

                Ok(rows
                    .iter()
                    .filter_map(RaceWinner::from_row)
                    .map(|mut winner| {
                        winner.nationality = winner
                            .nationality
                            .map(|n| countries.convert_or_name(&n, CodeSpace::IsoNumeric));
                        winner
                    })
                    .collect())
            })
            .await
    }

    /// Distance and average speed per edition
    pub async fn race_editions(&self, race: &str) -> Result<Vec<RaceEdition>> {
        let fetcher = self.fetcher;
        self.cache
            .call(ns::RACE_DETAILS, &(race,), || async move {
                let rows = fetcher
                    .fetch_race_stats(race)
                    .await
                    .with_context(|| format!("Failed to fetch editions of {}", race))?;
                Ok(rows.iter().filter_map(RaceEdition::from_row).collect())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::Cache;
    use crate::country::CountryTable;
    use crate::enrich::Enricher;
    use crate::fetch::stub::StubFetcher;
    use crate::fetch::{RankingQuery, RankingRow};

    #[tokio::test]
    async fn test_race_winners_nationality_codes() {
        let rows = vec![
            RankingRow::new()
                .with("rank", "1")
                .with("rider", "MERCKX Eddy")
                .with("nationality", "Belgium")
                .with("first_places", "5"),
            RankingRow::new()
                .with("rank", "2")
                .with("rider", "HINAULT Bernard")
                .with("nationality", "France")
                .with("first_places", "5"),
            RankingRow::new()
                .with("rank", "3")
                .with("rider", "GHOST Rider")
                .with("nationality", "Ruritania")
                .with("first_places", "1"),
        ];
        let fetcher = StubFetcher::new().ranking(
            RankingQuery::RaceMostWins { race: "tour-de-france".into() },
            rows,
        );
        let cache = Cache::in_memory();
        let enricher = Enricher::new(&fetcher, CountryTable::builtin(), &cache);

        let winners = enricher.race_winners("tour-de-france").await.unwrap();
        assert_eq!(winners[0].nationality.as_deref(), Some("056"));
        assert_eq!(winners[1].nationality.as_deref(), Some("250"));
        assert_eq!(winners[2].nationality.as_deref(), Some("Ruritania"));
    }

    #[tokio::test]
    async fn test_race_without_editions_is_empty() {
        let fetcher = StubFetcher::new().race_stats("world-championship", vec![]);
        let cache = Cache::in_memory();
        let enricher = Enricher::new(&fetcher, CountryTable::builtin(), &cache);

        assert!(enricher.race_editions("world-championship").await.unwrap().is_empty());
        assert!(enricher.race_editions("world-championship").await.unwrap().is_empty());
        assert_eq!(fetcher.calls("race_stats"), 1);
        assert!(enricher.race_editions("unknown-race").await.is_err());
    }
}
