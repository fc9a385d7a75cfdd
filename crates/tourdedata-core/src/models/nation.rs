use serde::{Deserialize, Serialize};

use super::columns;
use crate::fetch::RankingRow;

/// One row of the nations ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NationStanding {
    pub rank: Option<u32>,
    pub nation_name: String,
    pub nation_url: Option<String>,
    pub number_riders: Option<u32>,
    /// ISO numeric code, or the nation name when the lookup fails.
    /// The key name is what the map component reads.
    #[serde(rename = "country_iso3")]
    pub iso_numeric: String,
}

impl NationStanding {
    /// Raw fields of a ranking row; None when the row has no nation.
    /// `iso_numeric` starts as the name and is filled in by enrichment.
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        let nation_name = row.text(columns::NATION)?.to_string();
        Some(Self {
            rank: row.count(columns::RANK),
            nation_url: row.href(columns::NATION).map(|h| h.trim_start_matches('/').to_string()),
            number_riders: row.count(&["riders", "number_riders", "count"]),
            iso_numeric: nation_name.clone(),
            nation_name,
        })
    }
}

/// A nation in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NationRecord {
    pub name: String,
    /// ISO2 code, or the name when the lookup fails
    pub nationality: String,
    /// ISO numeric code, or the name when the lookup fails
    pub ison: String,
    pub teams: Vec<String>,
    #[serde(rename = "riders")]
    pub rider_urls: Vec<String>,
    pub wins: u32,
    pub pcs_points: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_from_row() {
        let row = RankingRow::new()
            .with("rank", "4")
            .with_link("nation", "Italy", "/nation/italy")
            .with("riders", "41");
        let standing = NationStanding::from_row(&row).expect("standing");
        assert_eq!(standing.rank, Some(4));
        assert_eq!(standing.nation_name, "Italy");
        assert_eq!(standing.nation_url.as_deref(), Some("nation/italy"));
        assert_eq!(standing.number_riders, Some(41));
    }

    #[test]
    fn test_standing_without_nation_is_skipped() {
        let row = RankingRow::new().with("rank", "1");
        assert!(NationStanding::from_row(&row).is_none());
    }

    #[test]
    fn test_record_serializes_rider_urls_as_riders() {
        let record = NationRecord {
            name: "italy".into(),
            nationality: "IT".into(),
            ison: "380".into(),
            teams: vec![],
            rider_urls: vec!["rider/filippo-ganna".into()],
            wins: 3,
            pcs_points: 100,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["riders"][0], "rider/filippo-ganna");
        assert_eq!(value["ison"], "380");
    }
}
