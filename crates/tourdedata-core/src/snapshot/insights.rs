use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AssemblyReport, SnapshotAssembler};
use crate::config::Seasons;
use crate::country::CountryLookup;
use crate::fetch::Fetcher;
use crate::models::{TeamEquipment, TeamWins};

/// Equipment and wins of a WorldTour team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamInfo {
    pub year: i32,
    pub team_name: String,
    pub bike: Option<String>,
    pub groupset: Option<String>,
    pub wheels: Option<String>,
    pub wins: u32,
}

/// Number of rider nationalities and wins of a team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamDiversity {
    pub year: i32,
    pub team_name: String,
    pub wins: u32,
    pub nationalities: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InsightsSnapshot {
    #[serde(rename = "teamsInfo")]
    pub teams_info: Vec<TeamInfo>,
    #[serde(rename = "teamsDiversity")]
    pub teams_diversity: Vec<TeamDiversity>,
}

fn wins_by_team(wins: &[TeamWins]) -> HashMap<&str, u32> {
    wins.iter()
        .map(|t| (t.team_name.trim(), t.number_of_wins))
        .collect()
}

/// Teams present in both listings, in wins-ranking order
fn join_equipment(year: i32, equipment: &[TeamEquipment], wins: &[TeamWins]) -> Vec<TeamInfo> {
    let by_name: HashMap<&str, &TeamEquipment> = equipment
        .iter()
        .map(|e| (e.team_name.trim(), e))
        .collect();

    wins.iter()
        .filter_map(|team| {
            let name = team.team_name.trim();
            let gear = by_name.get(name)?;
            Some(TeamInfo {
                year,
                team_name: name.to_string(),
                bike: gear.bike.clone(),
                groupset: gear.groupset.clone(),
                wheels: gear.wheels.clone(),
                wins: team.number_of_wins,
            })
        })
        .collect()
}

impl<F: Fetcher, L: CountryLookup> SnapshotAssembler<'_, F, L> {
    pub async fn insights(&self, seasons: &Seasons, report: &mut AssemblyReport) -> Result<InsightsSnapshot> {
        let mut snapshot = InsightsSnapshot::default();
        let enricher = &self.enricher;

        for year in seasons.team_equipment.years() {
            info!(year, "Processing team equipment");
            let Some(equipment) = self
                .listing(report, "team_equipment", year, enricher.team_equipment(year))
                .await?
            else {
                continue;
            };
            let Some(wins) = self
                .listing(report, "team_wins", year, enricher.team_wins(year))
                .await?
            else {
                continue;
            };
            snapshot
                .teams_info
                .extend(join_equipment(year, &equipment, &wins));
        }

        for year in seasons.team_diversity.years() {
            info!(year, "Processing team diversity");
            let Some(wins) = self
                .listing(report, "team_wins", year, enricher.team_wins(year))
                .await?
            else {
                continue;
            };
            let Some(team_urls) = self
                .listing(report, "teams", year, enricher.team_urls(year))
                .await?
            else {
                continue;
            };
            let wins = wins_by_team(&wins);

            for url in &team_urls {
                let Some(team) = self.entity(report, "team", url, enricher.team(url)).await else {
                    continue;
                };
                let name = team.name.trim();
                if name.is_empty() {
                    continue;
                }

                let mut nationalities = BTreeSet::new();
                for rider_url in &team.riders {
                    if let Some(rider) = self
                        .entity(report, "rider", rider_url, enricher.rider(rider_url))
                        .await
                    {
                        if let Some(nationality) = rider.nationality {
                            nationalities.insert(nationality);
                        }
                    }
                }

                snapshot.teams_diversity.push(TeamDiversity {
                    year,
                    team_name: name.to_string(),
                    wins: wins.get(name).copied().unwrap_or(0),
                    nationalities: nationalities.len(),
                });
            }
        }

        Ok(snapshot)
    }
}
