use serde::{Deserialize, Serialize};

use super::columns;
use crate::fetch::{RankingRow, RawTeam};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamRecord {
    pub name: String,
    pub abbreviation: Option<String>,
    pub nationality: Option<String>,
    pub class: Option<String>,
    pub bike_brand: Option<String>,
    pub season_wins: Option<u32>,
    pub pcs_points: Option<u32>,
    pub pcs_rank: Option<u32>,
    pub uci_rank: Option<u32>,
    pub riders: Vec<String>,
}

impl From<RawTeam> for TeamRecord {
    fn from(raw: RawTeam) -> Self {
        Self {
            name: raw.name,
            abbreviation: raw.abbreviation,
            nationality: raw.nationality,
            class: raw.status,
            bike_brand: raw.bike,
            season_wins: raw.wins,
            pcs_points: raw.pcs_points,
            pcs_rank: raw.pcs_rank,
            uci_rank: raw.uci_rank,
            riders: raw.rider_urls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamAge {
    pub rank: Option<u32>,
    pub team_name: String,
    pub average_age: Option<f64>,
}

impl TeamAge {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            rank: row.count(columns::RANK),
            team_name: row.text(columns::TEAM)?.to_string(),
            average_age: row.decimal(&["average_age", "avg_age", "age"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamEquipment {
    pub team_name: String,
    pub bike: Option<String>,
    pub groupset: Option<String>,
    pub wheels: Option<String>,
}

impl TeamEquipment {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        let owned = |cols: &[&str]| row.text(cols).map(str::to_string);
        Some(Self {
            team_name: row.text(columns::TEAM)?.to_string(),
            bike: owned(&["bike"]),
            groupset: owned(&["groupset"]),
            wheels: owned(&["wheels"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamWins {
    pub team_name: String,
    pub number_of_wins: u32,
}

impl TeamWins {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            team_name: row.text(columns::TEAM)?.to_string(),
            number_of_wins: row.count(columns::WINS).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_rows() {
        let row = RankingRow::new()
            .with("rank", "1")
            .with("team", "Lidl - Trek ")
            .with("average_age", "27.85")
            .with("bike", "Trek")
            .with("wins", "35");

        let age = TeamAge::from_row(&row).unwrap();
        assert_eq!(age.team_name, "Lidl - Trek");
        assert_eq!(age.average_age, Some(27.85));

        let gear = TeamEquipment::from_row(&row).unwrap();
        assert_eq!(gear.bike.as_deref(), Some("Trek"));
        assert_eq!(gear.groupset, None);

        let wins = TeamWins::from_row(&row).unwrap();
        assert_eq!(wins.number_of_wins, 35);
    }

    #[test]
    fn test_record_from_raw_keeps_class() {
        let raw = RawTeam {
            name: "Alpecin - Deceuninck".into(),
            status: Some("WT".into()),
            rider_urls: vec!["rider/mathieu-van-der-poel".into()],
            ..Default::default()
        };
        let record = TeamRecord::from(raw);
        assert_eq!(record.class.as_deref(), Some("WT"));
        assert_eq!(record.riders.len(), 1);
        assert_eq!(record.season_wins, None);
    }
}
