//! Entity enrichment on top of a [`Fetcher`].
//!
//! Every operation fetches raw records, derives the enriched fields
//! (country codes, ages, canonical names) and is memoized in the
//! [`Cache`] under its own namespace, so a re-run only hits the network
//! for what is missing.
//!
//! Country lookups that miss fall back to the input string.

mod nation;
mod race;
mod rider;
mod team;

use crate::cache::Cache;
use crate::country::CountryLookup;
use crate::fetch::Fetcher;

/// Cache namespaces, one per operation
pub mod namespaces {
    pub const NATIONS_RANKING: &str = "nations_ranking";
    pub const NATIONS: &str = "nations";
    pub const NATION: &str = "nation";
    pub const TEAMS: &str = "teams";
    pub const TEAM: &str = "team";
    pub const RIDER: &str = "rider";
    pub const AVERAGE_AGE: &str = "average_age";
    pub const YOUNGEST_AGE: &str = "youngest_age";
    pub const WINS_RANKING_TOP3: &str = "wins_ranking_top3";
    pub const WINS_RANKING: &str = "wins_ranking";
    pub const CONTRACT_RIDERS: &str = "contract_riders";
    pub const NATION_RIDERS: &str = "nation_riders";
    pub const RACE_WINNERS: &str = "race_winners";
    pub const RACE_DETAILS: &str = "race_details";
    pub const TEAM_EQUIPMENT: &str = "team_equipment";
    pub const TEAM_WINS: &str = "team_wins";

    pub const ALL: &[&str] = &[
        NATIONS_RANKING,
        NATIONS,
        NATION,
        TEAMS,
        TEAM,
        RIDER,
        AVERAGE_AGE,
        YOUNGEST_AGE,
        WINS_RANKING_TOP3,
        WINS_RANKING,
        CONTRACT_RIDERS,
        NATION_RIDERS,
        RACE_WINNERS,
        RACE_DETAILS,
        TEAM_EQUIPMENT,
        TEAM_WINS,
    ];
}

/// Cached enrichment operations over a fetcher and a country table
pub struct Enricher<'a, F, L> {
    fetcher: &'a F,
    countries: &'a L,
    cache: &'a Cache,
}

impl<'a, F: Fetcher, L: CountryLookup> Enricher<'a, F, L> {
    pub fn new(fetcher: &'a F, countries: &'a L, cache: &'a Cache) -> Self {
        Self {
            fetcher,
            countries,
            cache,
        }
    }

    pub fn cache(&self) -> &Cache {
        self.cache
    }

    pub fn countries(&self) -> &L {
        self.countries
    }
}

#[cfg(test)]
mod tests {
    use super::namespaces;
    use crate::cache::Cache;

    #[tokio::test]
    async fn test_every_namespace_is_valid() {
        let cache = Cache::in_memory();
        for ns in namespaces::ALL {
            let value: u32 = cache.call(ns, &(1,), || async { Ok(1) }).await.unwrap();
            assert_eq!(value, 1, "{}", ns);
        }
        assert_eq!(cache.stats().unwrap().len(), namespaces::ALL.len());
    }
}
