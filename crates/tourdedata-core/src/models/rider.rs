use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::columns;
use crate::fetch::{RankingRow, RawRider};

/// Season-independent rider data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RiderProfile {
    pub name: String,
    pub nationality: Option<String>,
    /// `YYYY-MM-DD`, or null when unknown or unparseable
    pub birthdate: Option<String>,
    pub place_of_birth: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub image_url: Option<String>,
    /// season -> team url
    pub teams_history: BTreeMap<String, String>,
    /// season -> PCS points
    pub pcs_points: BTreeMap<String, f64>,
    /// season -> PCS rank
    pub pcs_ranks: BTreeMap<String, u32>,
}

impl RiderProfile {
    /// Birthdate is expected already normalized by the caller
    pub fn from_raw(raw: RawRider, birthdate: Option<String>) -> Self {
        let teams_history = raw
            .teams_history
            .into_iter()
            .map(|t| (t.season.to_string(), t.team_url))
            .collect();
        let pcs_points = raw
            .points_history
            .iter()
            .map(|p| (p.season.to_string(), p.points))
            .collect();
        let pcs_ranks = raw
            .points_history
            .iter()
            .filter_map(|p| Some((p.season.to_string(), p.rank?)))
            .collect();

        Self {
            name: raw.name.trim().to_string(),
            nationality: raw.nationality,
            birthdate,
            place_of_birth: raw.place_of_birth,
            weight: raw.weight,
            height: raw.height,
            image_url: raw.image_url,
            teams_history,
            pcs_points,
            pcs_ranks,
        }
    }
}

/// A rider as seen in one season: profile plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SeasonRider {
    pub url: String,
    #[serde(flatten)]
    pub profile: RiderProfile,
    pub season: Option<i32>,
    /// Completed years on 31 December of `season`; null if birthdate unknown
    pub age: Option<u32>,
    /// Team url for `season`, from the teams history
    pub team: Option<String>,
    /// Short country name, or the published nationality when the lookup fails
    pub nationality_name: Option<String>,
    /// WorldTour-level wins in `season`, joined by canonical name
    #[serde(default)]
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct YoungestRider {
    pub rank: Option<u32>,
    pub rider_name: String,
    pub min_age: Option<f64>,
}

impl YoungestRider {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            rank: row.count(columns::RANK),
            rider_name: row.text(columns::RIDER)?.to_string(),
            min_age: row.decimal(&["age", "min_age"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RiderWins {
    pub rank: Option<u32>,
    pub rider_name: String,
    pub number_of_wins: u32,
    pub rider_url: Option<String>,
    pub picture: Option<String>,
    /// Short country name, or the published value when the lookup fails
    pub nationality: Option<String>,
}

impl RiderWins {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            rank: row.count(columns::RANK),
            rider_name: row.text(columns::RIDER)?.to_string(),
            number_of_wins: row.count(columns::WINS).unwrap_or(0),
            rider_url: row.href(columns::RIDER).map(|h| h.trim_start_matches('/').to_string()),
            picture: None,
            nationality: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ContractRider {
    pub rider_name: String,
    pub team_name: Option<String>,
    pub rider_url: Option<String>,
}

impl ContractRider {
    pub fn from_row(row: &RankingRow) -> Option<Self> {
        Some(Self {
            rider_name: row.text(columns::RIDER)?.to_string(),
            team_name: row.text(columns::TEAM).map(str::to_string),
            rider_url: row.href(columns::RIDER).map(|h| h.trim_start_matches('/').to_string()),
        })
    }
}

/// Name, age and nationality of a contract rider in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RiderAge {
    pub name: String,
    pub age: u32,
    pub nationality: Option<String>,
}
