use serde::{Deserialize, Serialize};

/// The listings we read from procyclingstats.
///
/// Serializable so a query can be part of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingQuery {
    /// Nations ranked by number of WorldTour riders
    Nations { year: i32 },
    /// Riders under WorldTour contract for a nation (country id is ISO2 or name)
    ContractRiders { year: i32, country: String },
    /// Average rider age per team
    TeamAverageAge { year: i32 },
    /// Youngest riders of the season
    YoungestRiders { year: i32 },
    /// Riders ranked by WorldTour-level wins
    RiderWins { year: i32 },
    /// Riders with the most wins of a race, all editions
    RaceMostWins { race: String },
    /// Bike, groupset and wheels per WorldTour team
    TeamEquipment { year: i32 },
    /// WorldTour wins per WorldTour team
    TeamWins { year: i32 },
}

impl RankingQuery {
    /// Path relative to the site root
    pub fn path(&self) -> String {
        match self {
            RankingQuery::Nations { year } => format!(
                "statistics.php?season={}&level=1&sekse=1&filter=Filter&p=nations",
                year
            ),
            RankingQuery::ContractRiders { year, country } => format!(
                "nation.php?season={}&level=wt&filter=Filter&id={}&c=me&p=overview&s=contract-riders",
                year, country
            ),
            RankingQuery::TeamAverageAge { year } => format!(
                "statistics.php?year={}&level=1&sekse=1&filter=Filter&p=teams&s=average-age",
                year
            ),
            RankingQuery::YoungestRiders { year } => format!(
                "statistics.php?year={}&sekse=1&level=1&filter=Filter&p=riders&s=youngest-riders",
                year
            ),
            RankingQuery::RiderWins { year } => format!(
                "statistics.php?year={}&mw=1&filter=Filter&p=riders&s=wins-on-wt-level",
                year
            ),
            RankingQuery::RaceMostWins { race } => format!(
                "race.php?fnation=&stripped=0&filter=Filter&id1={}&id2=results&id3=most-wins",
                race
            ),
            RankingQuery::TeamEquipment { year } => format!(
                "statistics.php?season={}&level=wt&filter=Filter&p=gear",
                year
            ),
            RankingQuery::TeamWins { year } => format!(
                "statistics.php?year={}&filter=Filter&p=teams&s=wt-wins-for-wt-teams",
                year
            ),
        }
    }
}
