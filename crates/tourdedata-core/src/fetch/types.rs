//! Raw records as returned by a `Fetcher`, before any enrichment.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::{parse_count, parse_decimal};

/// One table cell: its text and the first link inside it, if any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// One row of a ranking/listing table, keyed by normalized column name.
///
/// Accessors take a list of accepted column names because the same
/// quantity is labelled differently across listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    cells: BTreeMap<String, Cell>,
}

impl RankingRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and stub fetchers
    pub fn with(mut self, column: &str, text: &str) -> Self {
        self.insert(column.to_string(), Cell::new(text));
        self
    }

    pub fn with_link(mut self, column: &str, text: &str, href: &str) -> Self {
        self.insert(column.to_string(), Cell::link(text, href));
        self
    }

    pub fn insert(&mut self, column: String, cell: Cell) {
        self.cells.insert(column, cell);
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    fn cell(&self, columns: &[&str]) -> Option<&Cell> {
        columns.iter().find_map(|c| self.cells.get(*c))
    }

    /// First non-empty text among the given columns
    pub fn text(&self, columns: &[&str]) -> Option<&str> {
        columns
            .iter()
            .filter_map(|c| self.cells.get(*c))
            .map(|cell| cell.text.trim())
            .find(|t| !t.is_empty())
    }

    pub fn href(&self, columns: &[&str]) -> Option<&str> {
        self.cell(columns).and_then(|c| c.href.as_deref())
    }

    /// Integer value, ignoring thousands separators and trailing units
    pub fn count<T: FromStr>(&self, columns: &[&str]) -> Option<T> {
        self.text(columns).and_then(|t| parse_count::<T>(t))
    }

    pub fn decimal(&self, columns: &[&str]) -> Option<f64> {
        self.text(columns).and_then(parse_decimal)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNation {
    pub name: String,
    pub team_urls: Vec<String>,
    pub rider_urls: Vec<String>,
    pub wins: u32,
    pub pcs_points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    pub name: String,
    pub abbreviation: Option<String>,
    pub nationality: Option<String>,
    pub status: Option<String>,
    pub bike: Option<String>,
    pub wins: Option<u32>,
    pub pcs_points: Option<u32>,
    pub pcs_rank: Option<u32>,
    pub uci_rank: Option<u32>,
    pub rider_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTeam {
    pub season: i32,
    pub team_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonPoints {
    pub season: i32,
    pub points: f64,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRider {
    pub name: String,
    /// Nationality as published, usually an ISO2 code or a country name
    pub nationality: Option<String>,
    /// Birthdate as published, possibly unpadded (`1998-9-21`)
    pub birthdate: Option<String>,
    pub place_of_birth: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub image_url: Option<String>,
    pub teams_history: Vec<SeasonTeam>,
    pub points_history: Vec<SeasonPoints>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_accessors_use_first_matching_column() {
        let row = RankingRow::new()
            .with("rank", "3")
            .with("team", "")
            .with("team_name", "Team Visma | Lease a Bike")
            .with("distance", "3,405.8 km");
        assert_eq!(row.text(&["team", "team_name"]), Some("Team Visma | Lease a Bike"));
        assert_eq!(row.count::<u32>(&["rank"]), Some(3));
        assert_eq!(row.decimal(&["distance"]), Some(3405.8));
        assert_eq!(row.text(&["missing"]), None);
        assert_eq!(row.count::<u32>(&["team"]), None);
    }
}
