use serde::{Deserialize, Serialize};

use super::columns;
use crate::fetch::RankingRow;

/// A rider in the all-time most-wins list of a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RaceWinner {
    pub rank: Option<u32>,
    pub rider_name: String,
    /// ISO numeric code, or the published nationality when the lookup fails
    pub nationality: Option<String>,
    pub first_places: u32,
}

impl RaceWinner {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            rank: row.count(columns::RANK),
            rider_name: row.text(columns::RIDER)?.to_string(),
            nationality: row.text(&["nationality", "nation", "country"]).map(str::to_string),
            first_places: row.count(columns::WINS).unwrap_or(0),
        })
    }
}

/// Distance and average speed of one edition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RaceEdition {
    pub year: i32,
    pub distance: Option<f64>,
    pub average_speed: Option<f64>,
}

impl RaceEdition {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            year: row.count(&["year", "season", "edition"])?,
            distance: row.decimal(&["distance"]),
            average_speed: row.decimal(&["average_speed", "avg_speed", "speed"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edition_from_row() {
        let row = RankingRow::new()
            .with("year", "2023")
            .with("distance", "3405.6 km")
            .with("avg_speed", "41.4 km/h");
        let edition = RaceEdition::from_row(&row).unwrap();
        assert_eq!(edition.year, 2023);
        assert_eq!(edition.distance, Some(3405.6));
        assert_eq!(edition.average_speed, Some(41.4));
    }

    #[test]
    fn test_edition_without_year_is_skipped() {
        let row = RankingRow::new().with("distance", "250 km");
        assert!(RaceEdition::from_row(&row).is_none());
    }

    #[test]
    fn test_winner_from_row() {
        let row = RankingRow::new()
            .with("rank", "1")
            .with("rider", "MERCKX Eddy")
            .with("nationality", "Belgium")
            .with("first_places", "5");
        let winner = RaceWinner::from_row(&row).unwrap();
        assert_eq!(winner.first_places, 5);
        assert_eq!(winner.nationality.as_deref(), Some("Belgium"));
    }
}
