use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AssemblyReport, SnapshotAssembler};
use crate::config::Seasons;
use crate::country::CountryLookup;
use crate::fetch::Fetcher;
use crate::models::{NationStanding, RiderAge, RiderWins, TeamAge, YoungestRider};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NationRankings {
    pub ranking: BTreeMap<i32, Vec<NationStanding>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AgeRankings {
    pub average: BTreeMap<i32, Vec<TeamAge>>,
    pub youngest: BTreeMap<i32, Vec<YoungestRider>>,
    /// Contract riders of every ranked nation, by nation name
    pub nations: BTreeMap<i32, BTreeMap<String, Vec<RiderAge>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct WinnerRankings {
    pub top3: BTreeMap<i32, Vec<RiderWins>>,
}

/// Season rankings of the WorldTour peloton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PelotonSnapshot {
    pub nations: NationRankings,
    pub ages: AgeRankings,
    pub winners: WinnerRankings,
}

impl<F: Fetcher, L: CountryLookup> SnapshotAssembler<'_, F, L> {
    pub async fn peloton(&self, seasons: &Seasons, report: &mut AssemblyReport) -> Result<PelotonSnapshot> {
        let mut snapshot = PelotonSnapshot::default();
        let enricher = &self.enricher;

        for year in seasons.nations_ranking.years() {
            info!(year, "Processing nations ranking");
            if let Some(ranking) = self
                .listing(report, "nations_ranking", year, enricher.nation_standings(year))
                .await?
            {
                snapshot.nations.ranking.insert(year, ranking);
            }
        }

        for year in seasons.average_ages.years() {
            info!(year, "Processing average ages");
            if let Some(ages) = self
                .listing(report, "average_age", year, enricher.team_average_ages(year))
                .await?
            {
                snapshot.ages.average.insert(year, ages);
            }
        }

        for year in seasons.youngest_riders.years() {
            info!(year, "Processing youngest riders");
            if let Some(youngest) = self
                .listing(report, "youngest_age", year, enricher.youngest_riders(year))
                .await?
            {
                snapshot.ages.youngest.insert(year, youngest);
            }
        }

        for year in seasons.nations_detail.years() {
            info!(year, "Processing rider ages per nation");
            let Some(standings) = self
                .listing(report, "nation_riders", year, enricher.nation_standings(year))
                .await?
            else {
                continue;
            };

            let mut per_nation = BTreeMap::new();
            for standing in &standings {
                let name = standing.nation_name.as_str();
                if let Some(ages) = self
                    .entity(report, "nation_riders", name, enricher.nation_rider_ages(year, name))
                    .await
                {
                    per_nation.insert(name.to_string(), ages);
                }
            }
            snapshot.ages.nations.insert(year, per_nation);
        }

        for year in seasons.top3_winners.years() {
            info!(year, "Processing top winners");
            if let Some(top3) = self
                .listing(report, "wins_ranking_top3", year, enricher.wins_top3(year))
                .await?
            {
                snapshot.winners.top3.insert(year, top3);
            }
        }

        Ok(snapshot)
    }
}
