//! Enriched records, one strongly typed struct per entity kind.
//!
//! These are what the cache stores and what the snapshots serialize.
//! Field names follow the JSON keys the front end reads.
//!
//! - `NationStanding`, `NationRecord`: nations ranking and per-season detail
//! - `TeamRecord`, `TeamAge`, `TeamEquipment`, `TeamWins`: team data
//! - `RiderProfile`, `SeasonRider`, rider rankings
//! - `RaceWinner`, `RaceEdition`: per-race history

pub mod nation;
pub mod race;
pub mod rider;
pub mod team;

pub use nation::{NationRecord, NationStanding};
pub use race::{RaceEdition, RaceWinner};
pub use rider::{ContractRider, RiderAge, RiderProfile, RiderWins, SeasonRider, YoungestRider};
pub use team::{TeamAge, TeamEquipment, TeamRecord, TeamWins};

/// Column names accepted for the shared quantities of ranking rows
pub(crate) mod columns {
    pub const RANK: &[&str] = &["rank", "pos"];
    pub const NATION: &[&str] = &["nation", "nation_name", "country"];
    pub const TEAM: &[&str] = &["team", "team_name"];
    pub const RIDER: &[&str] = &["rider", "rider_name", "name"];
    pub const WINS: &[&str] = &["wins", "number_of_wins", "first_places", "won", "count"];
}
