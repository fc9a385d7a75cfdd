//! In-memory `Fetcher` for tests. Unknown ids answer `NotFound`; ids
//! registered with `fail` answer a server error. Every call is recorded.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::types::{RankingRow, RawNation, RawRider, RawTeam};
use super::{FetchError, Fetcher, RankingQuery};

#[derive(Default)]
pub struct StubFetcher {
    rankings: HashMap<String, Vec<RankingRow>>,
    nations: HashMap<(i32, String), RawNation>,
    team_lists: HashMap<i32, Vec<String>>,
    teams: HashMap<String, RawTeam>,
    riders: HashMap<String, RawRider>,
    race_stats: HashMap<String, Vec<RankingRow>>,
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranking(mut self, query: RankingQuery, rows: Vec<RankingRow>) -> Self {
        self.rankings.insert(query.path(), rows);
        self
    }

    pub fn nation(mut self, year: i32, url: &str, nation: RawNation) -> Self {
        self.nations.insert((year, url.to_string()), nation);
        self
    }

    pub fn team_list(mut self, year: i32, urls: &[&str]) -> Self {
        self.team_lists
            .insert(year, urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn team(mut self, url: &str, team: RawTeam) -> Self {
        self.teams.insert(url.to_string(), team);
        self
    }

    pub fn rider(mut self, url: &str, rider: RawRider) -> Self {
        self.riders.insert(url.to_string(), rider);
        self
    }

    pub fn race_stats(mut self, race: &str, rows: Vec<RankingRow>) -> Self {
        self.race_stats.insert(race.to_string(), rows);
        self
    }

    /// Make any call whose id equals `id` fail with a server error
    pub fn fail(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Number of recorded calls whose description starts with `prefix`
    pub fn calls(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn answer<T: Clone>(&self, op: &str, id: &str, found: Option<&T>) -> Result<T, FetchError> {
        self.calls.borrow_mut().push(format!("{} {}", op, id));
        if self.failing.contains(id) {
            return Err(FetchError::Server(format!("stub failure for {}", id)));
        }
        found
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

impl Fetcher for StubFetcher {
    async fn fetch_ranking(&self, query: &RankingQuery) -> Result<Vec<RankingRow>, FetchError> {
        let path = query.path();
        self.answer("ranking", &path, self.rankings.get(&path))
    }

    async fn fetch_nation(&self, year: i32, nation_url: &str) -> Result<RawNation, FetchError> {
        self.answer(
            "nation",
            nation_url,
            self.nations.get(&(year, nation_url.to_string())),
        )
    }

    async fn fetch_teams(&self, year: i32) -> Result<Vec<String>, FetchError> {
        self.answer("teams", &year.to_string(), self.team_lists.get(&year))
    }

    async fn fetch_team(&self, team_url: &str) -> Result<RawTeam, FetchError> {
        self.answer("team", team_url, self.teams.get(team_url))
    }

    async fn fetch_rider(&self, rider_url: &str) -> Result<RawRider, FetchError> {
        self.answer("rider", rider_url, self.riders.get(rider_url))
    }

    async fn fetch_race_stats(&self, race_id: &str) -> Result<Vec<RankingRow>, FetchError> {
        self.answer("race_stats", race_id, self.race_stats.get(race_id))
    }
}
