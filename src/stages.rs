use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::PageSource;
use crate::settings::RaceEdition;

static OPTION_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option[value]").unwrap());

/// One stage result page, in tour order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReference {
    /// 1-based position in the discovered sequence.
    pub index: usize,
    /// Number embedded in the path (`stage-<n>`).
    pub number: u32,
    /// Site-relative path, e.g. `race/tour-de-france/2023/stage-4`.
    pub path: String,
}

impl StageReference {
    /// Path of the GC standings after this stage (not valid for the final stage).
    pub fn gc_path(&self) -> String {
        format!("{}-gc", self.path)
    }
}

/// Fetch the race landing page and list its stages.
pub fn locate(source: &impl PageSource, edition: &RaceEdition) -> Result<Vec<StageReference>, FetchError> {
    info!("Discovering stages: {}", edition.path());
    let doc = source.fetch(&edition.path())?;
    let stages = stage_references(&doc, &edition.slug, edition.year);
    info!("Stages found: {}", stages.len());
    Ok(stages)
}

/// Collect `race/<slug>/<year>/stage-<n>` entries from the stage selector,
/// deduplicated and ordered by `n`.
pub fn stage_references(doc: &Html, slug: &str, year: i32) -> Vec<StageReference> {
    let pattern = format!(r"^race/{}/{}/stage-(\d+)$", regex::escape(slug), year);
    // slug is escaped and year is numeric, so the pattern always compiles
    let re = Regex::new(&pattern).expect("stage path pattern");

    let mut by_number: BTreeMap<u32, String> = BTreeMap::new();
    for option in doc.select(&OPTION_SEL) {
        let Some(value) = option.value().attr("value") else {
            continue;
        };
        let value = value.trim().trim_start_matches('/');
        let Some(number) = re
            .captures(value)
            .and_then(|c| c[1].parse::<u32>().ok())
        else {
            continue;
        };
        if by_number.contains_key(&number) {
            debug!("Duplicate stage entry ignored: {}", value);
            continue;
        }
        by_number.insert(number, value.to_string());
    }

    by_number
        .into_iter()
        .enumerate()
        .map(|(i, (number, path))| StageReference {
            index: i + 1,
            number,
            path,
        })
        .collect()
}
