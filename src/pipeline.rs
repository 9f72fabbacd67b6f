use tracing::{info, warn};

use crate::duration;
use crate::error::{FetchError, ScrapeError};
use crate::fetch::PageSource;
use crate::parser::gc::{self, GcRow};
use crate::parser::metadata::{self, StageMetadata};
use crate::settings::{OverallTimeMode, RaceEdition, Settings};
use crate::stages::{self, StageReference};
use crate::store::{OutputRecord, RecordSink, StageKey};

/// Why a stage produced no file.
#[derive(Debug)]
pub enum SkipReason {
    Fetch(FetchError),
    NoGcRows,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "{}", e),
            SkipReason::NoGcRows => write!(f, "no GC data"),
        }
    }
}

/// Outcome of one `(race, year)` run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub discovered: usize,
    pub expected: usize,
    pub written: Vec<usize>,
    pub skipped: Vec<(usize, SkipReason)>,
}

impl RunReport {
    pub fn stage_count_mismatch(&self) -> bool {
        self.discovered != self.expected
    }
}

/// Drives discovery, per-stage extraction and persistence, one stage at a time.
pub struct Pipeline<'a, S, K> {
    settings: &'a Settings,
    source: S,
    sink: K,
}

impl<'a, S: PageSource, K: RecordSink> Pipeline<'a, S, K> {
    pub fn new(settings: &'a Settings, source: S, sink: K) -> Self {
        Pipeline {
            settings,
            source,
            sink,
        }
    }

    pub fn run(&mut self, race_key: &str, year: i32) -> Result<RunReport, ScrapeError> {
        let edition = self.settings.edition(race_key, year)?;

        let stage_refs =
            stages::locate(&self.source, &edition).map_err(|source| ScrapeError::Discovery {
                slug: edition.slug.clone(),
                year,
                source,
            })?;
        let total = stage_refs.len();

        let mut report = RunReport {
            discovered: total,
            expected: self.settings.expected_stages,
            ..RunReport::default()
        };

        if report.stage_count_mismatch() {
            warn!(expected = report.expected, found = total, "Unexpected stage count");
            println!("WARNING: expected {} stages, found {}", report.expected, total);
        }

        for stage in &stage_refs {
            println!("Stage {}", stage.index);
            let is_final = stage.index == total;

            let (meta, rows) = match self.scrape_stage(&edition, stage, is_final) {
                Ok(parts) => parts,
                Err(e) => {
                    warn!(stage = stage.index, "Stage skipped: {}", e);
                    println!("  Skipped: {}", e);
                    report.skipped.push((stage.index, SkipReason::Fetch(e)));
                    continue;
                }
            };

            if rows.is_empty() {
                println!("  No GC data found, skipping");
                report.skipped.push((stage.index, SkipReason::NoGcRows));
                continue;
            }

            let records = assemble(&edition, stage.index, &meta, &rows, self.settings.overall_time);
            let key = StageKey {
                race_key: edition.race_key.clone(),
                year: edition.year,
                stage_index: stage.index,
            };
            let path = self.sink.write(&key, &records)?;
            info!(stage = stage.index, riders = records.len(), "Stage saved");
            println!("  Saved {}", path.display());
            report.written.push(stage.index);
        }

        Ok(report)
    }

    fn scrape_stage(
        &self,
        edition: &RaceEdition,
        stage: &StageReference,
        is_final: bool,
    ) -> Result<(StageMetadata, Vec<GcRow>), FetchError> {
        let page = self.source.fetch(&stage.path)?;
        let meta = metadata::extract(&page);
        let rows = gc::extract(&self.source, edition, stage, is_final, self.settings.top_n)?;
        Ok((meta, rows))
    }
}

/// Join stage metadata with each GC row.
pub fn assemble(
    edition: &RaceEdition,
    stage_index: usize,
    meta: &StageMetadata,
    rows: &[GcRow],
    mode: OverallTimeMode,
) -> Vec<OutputRecord> {
    let leader_seconds = rows
        .iter()
        .find(|r| r.rank == 1)
        .or_else(|| rows.first())
        .map(|r| duration::to_seconds(&r.overall_time))
        .unwrap_or(0);

    rows.iter()
        .map(|row| OutputRecord {
            race: edition.race_key.clone(),
            year: edition.year,
            stage: stage_index,
            stage_finish: meta.finish.clone(),
            stage_distance_km: meta.distance_km,
            stage_profile: meta.profile.clone(),
            stage_date: meta.date,
            rank: row.rank,
            rider: row.rider.clone(),
            team: row.team.clone(),
            gap: (!row.gap_raw.is_empty()).then(|| row.gap_raw.clone()),
            gap_seconds: row.gap_seconds,
            overall_time: match mode {
                OverallTimeMode::Scraped => row.overall_time.clone(),
                OverallTimeMode::LeaderRelative => {
                    duration::to_hms(leader_seconds.saturating_add(row.gap_seconds))
                }
            },
        })
        .collect()
}
