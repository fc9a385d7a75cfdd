//! Command line definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tourdedata_core::YearRange;

#[derive(Parser, Debug)]
#[command(name = "tourdedata")]
#[command(about = "Build Tour de Data JSON snapshots from procyclingstats.com", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/tourdedata/config.json)
    #[arg(long, global = true, env = "TOURDEDATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache directory, overrides config and TOURDEDATA_CACHE_DIR
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Also write the snapshot to this file
    #[arg(long, global = true)]
    pub backup: Option<PathBuf>,

    /// Stop at the first listing that fails instead of skipping it
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Append logs to this file as well as stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Nations per season with their riders (age, team, wins)
    Nations(YearArgs),

    /// Nations ranking, team average ages, youngest riders and top winners
    Peloton(YearArgs),

    /// Most-wins lists and edition statistics of the major races
    Races {
        /// Race ids, comma separated (default: the configured list)
        #[arg(long = "race", value_delimiter = ',')]
        races: Vec<String>,
    },

    /// Team equipment, wins and rider nationalities
    Insights(YearArgs),

    /// Inspect or clear the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Entries and age of the newest entry per namespace
    Stats,

    /// Remove cached entries
    Clear {
        /// Only this namespace (e.g. rider, team_wins)
        namespace: Option<String>,
    },
}

/// Season overrides shared by the snapshot commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct YearArgs {
    /// First season
    #[arg(long)]
    pub from: Option<i32>,

    /// Last season
    #[arg(long)]
    pub to: Option<i32>,
}

impl YearArgs {
    /// Replace the ends of `range` that were given on the command line
    pub fn apply(&self, range: YearRange) -> Result<YearRange> {
        let range = YearRange::new(self.from.unwrap_or(range.from), self.to.unwrap_or(range.to));
        range.validate("--from/--to")?;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_command_with_globals() {
        let cli = Cli::try_parse_from([
            "tourdedata",
            "nations",
            "--from",
            "2020",
            "--fail-fast",
            "--backup",
            "out/nations.json",
        ])
        .unwrap();

        assert!(cli.fail_fast);
        assert_eq!(cli.backup, Some(PathBuf::from("out/nations.json")));
        match cli.command {
            Commands::Nations(years) => {
                assert_eq!(years.from, Some(2020));
                assert_eq!(years.to, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_races_list() {
        let cli = Cli::try_parse_from(["tourdedata", "races", "--race", "paris-roubaix,il-lombardia"]).unwrap();
        match cli.command {
            Commands::Races { races } => assert_eq!(races, vec!["paris-roubaix", "il-lombardia"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_cache_clear() {
        let cli = Cli::try_parse_from(["tourdedata", "cache", "clear", "rider"]).unwrap();
        match cli.command {
            Commands::Cache(CacheCommands::Clear { namespace }) => {
                assert_eq!(namespace.as_deref(), Some("rider"))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_year_args_override_one_end() {
        let years = YearArgs { from: Some(2015), to: None };
        assert_eq!(years.apply(YearRange::new(2010, 2025)).unwrap(), YearRange::new(2015, 2025));

        let inverted = YearArgs { from: Some(2030), to: None };
        assert!(inverted.apply(YearRange::new(2010, 2025)).is_err());
        assert_eq!(YearArgs::default().apply(YearRange::new(1, 2)).unwrap(), YearRange::new(1, 2));
    }
}
