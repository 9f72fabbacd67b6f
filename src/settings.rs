use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ScrapeError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How `overall_time` is filled in on output records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallTimeMode {
    /// Cell text from the GC table, verbatim.
    #[default]
    Scraped,
    /// Leader's time plus each rider's gap, as `HH:MM:SS`.
    LeaderRelative,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub output_root: PathBuf,
    pub top_n: usize,
    pub expected_stages: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub races: BTreeMap<String, String>,
    pub overall_time: OverallTimeMode,
}

impl Default for Settings {
    fn default() -> Self {
        let races = [
            ("tdf", "tour-de-france"),
            ("giro", "giro-d-italia"),
            ("vuelta", "vuelta-a-espana"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Settings {
            base_url: "https://www.procyclingstats.com".into(),
            output_root: PathBuf::from("data"),
            top_n: 10,
            expected_stages: 21,
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: 30,
            races,
            overall_time: OverallTimeMode::Scraped,
        }
    }
}

impl Settings {
    /// Defaults, then `gc_scraper.*` (or `explicit`, which must exist), then `GC_*` env vars.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("gc_scraper").required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("GC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn edition(&self, race_key: &str, year: i32) -> Result<RaceEdition, ScrapeError> {
        let slug = self
            .races
            .get(race_key)
            .ok_or_else(|| ScrapeError::UnknownRace(race_key.to_string()))?;
        Ok(RaceEdition {
            race_key: race_key.to_string(),
            slug: slug.clone(),
            year,
        })
    }
}

/// One edition of one tour, e.g. `tdf` 2023 → `tour-de-france`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceEdition {
    pub race_key: String,
    pub slug: String,
    pub year: i32,
}

impl RaceEdition {
    /// Site-relative path of the race landing page.
    pub fn path(&self) -> String {
        format!("race/{}/{}", self.slug, self.year)
    }
}
