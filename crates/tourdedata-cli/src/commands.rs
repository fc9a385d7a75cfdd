//! Command implementations.

use anyhow::{bail, Result};
use tracing::{info, warn};

use tourdedata_core::cache::PartitionStats;
use tourdedata_core::config::{Config, Seasons};
use tourdedata_core::enrich::namespaces;
use tourdedata_core::{AssemblyReport, Cache, CountryLookup, Fetcher, SnapshotAssembler};

use crate::cli::{CacheCommands, Commands};
use crate::output::to_pretty_json;

/// Build the snapshot a command asks for, serialized for output
pub async fn build_snapshot<F: Fetcher, L: CountryLookup>(
    assembler: &SnapshotAssembler<'_, F, L>,
    command: &Commands,
    config: &Config,
    report: &mut AssemblyReport,
) -> Result<String> {
    let mut seasons: Seasons = config.seasons.clone();

    match command {
        Commands::Nations(years) => {
            let range = years.apply(seasons.nations_detail)?;
            to_pretty_json(&assembler.nations(range, report).await?)
        }
        Commands::Peloton(years) => {
            for range in [
                &mut seasons.nations_ranking,
                &mut seasons.average_ages,
                &mut seasons.youngest_riders,
                &mut seasons.top3_winners,
                &mut seasons.nations_detail,
            ] {
                *range = years.apply(*range)?;
            }
            to_pretty_json(&assembler.peloton(&seasons, report).await?)
        }
        Commands::Races { races } => {
            let races = if races.is_empty() { &config.races } else { races };
            to_pretty_json(&assembler.races(races, report).await?)
        }
        Commands::Insights(years) => {
            seasons.team_equipment = years.apply(seasons.team_equipment)?;
            seasons.team_diversity = years.apply(seasons.team_diversity)?;
            to_pretty_json(&assembler.insights(&seasons, report).await?)
        }
        Commands::Cache(_) => bail!("cache commands do not produce a snapshot"),
    }
}

fn stats_lines(stats: &[PartitionStats]) -> Vec<String> {
    let mut lines = vec![format!("{:<20} {:>8}  {}", "NAMESPACE", "ENTRIES", "NEWEST")];
    for partition in stats {
        lines.push(format!(
            "{:<20} {:>8}  {}",
            partition.name,
            partition.entries,
            partition.newest_display()
        ));
    }
    let total: usize = stats.iter().map(|p| p.entries).sum();
    lines.push(format!("{:<20} {:>8}", "total", total));
    lines
}

/// Run a `cache` subcommand, returning the lines to print
pub fn run_cache(cache: &Cache, command: &CacheCommands) -> Result<Vec<String>> {
    match command {
        CacheCommands::Stats => Ok(stats_lines(&cache.stats()?)),
        CacheCommands::Clear { namespace } => {
            if let Some(ns) = namespace.as_deref() {
                if !namespaces::ALL.contains(&ns) {
                    warn!(namespace = ns, "Not a namespace this tool writes");
                }
            }
            let removed = cache.clear(namespace.as_deref())?;
            info!(removed, namespace = ?namespace, "Cache cleared");
            Ok(vec![format!("Removed {} entries", removed)])
        }
    }
}
