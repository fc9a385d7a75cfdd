//! Application configuration management.
//!
//! Configuration is a JSON file at `~/.config/tourdedata/config.json` (or
//! the path given on the command line). Every field has a default, so a
//! missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetch::client::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "tourdedata";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the cache location
pub const CACHE_DIR_ENV: &str = "TOURDEDATA_CACHE_DIR";

/// Inclusive range of seasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub const fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.from..=self.to
    }

    pub fn len(&self) -> usize {
        if self.to < self.from {
            0
        } else {
            (self.to - self.from + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if self.from > self.to {
            bail!("Invalid year range for {}: {} > {}", name, self.from, self.to);
        }
        Ok(())
    }
}

/// Year ranges of every snapshot section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seasons {
    pub nations_ranking: YearRange,
    pub average_ages: YearRange,
    pub youngest_riders: YearRange,
    pub top3_winners: YearRange,
    pub nations_detail: YearRange,
    pub team_equipment: YearRange,
    pub team_diversity: YearRange,
}

impl Default for Seasons {
    fn default() -> Self {
        Self {
            nations_ranking: YearRange::new(1930, 2025),
            average_ages: YearRange::new(1930, 2025),
            youngest_riders: YearRange::new(1980, 2025),
            top3_winners: YearRange::new(2010, 2025),
            nations_detail: YearRange::new(2024, 2025),
            team_equipment: YearRange::new(2010, 2025),
            team_diversity: YearRange::new(2000, 2025),
        }
    }
}

impl Seasons {
    fn validate(&self) -> Result<()> {
        self.nations_ranking.validate("nations_ranking")?;
        self.average_ages.validate("average_ages")?;
        self.youngest_riders.validate("youngest_riders")?;
        self.top3_winners.validate("top3_winners")?;
        self.nations_detail.validate("nations_detail")?;
        self.team_equipment.validate("team_equipment")?;
        self.team_diversity.validate("team_diversity")?;
        Ok(())
    }
}

pub fn default_races() -> Vec<String> {
    [
        "tour-de-france",
        "giro-d-italia",
        "vuelta-a-espana",
        "paris-roubaix",
        "liege-bastogne-liege",
        "milano-sanremo",
        "ronde-van-vlaanderen",
        "il-lombardia",
        "world-championship",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the platform cache directory
    pub cache_dir: Option<PathBuf>,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub seasons: Seasons,
    /// Race ids for the races snapshot
    pub races: Vec<String>,
    /// Also write every snapshot to this file
    pub backup: Option<PathBuf>,
    /// Abort on the first failed listing instead of skipping the year
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            seasons: Seasons::default(),
            races: default_races(),
            backup: None,
            fail_fast: false,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when None.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.seasons.validate()?;
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache location: config value, then `TOURDEDATA_CACHE_DIR`, then the
    /// platform cache directory
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
