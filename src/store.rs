use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// One rider's GC standing after one stage. The unit written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub race: String,
    pub year: i32,
    pub stage: usize,
    pub stage_finish: Option<String>,
    pub stage_distance_km: Option<f64>,
    pub stage_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_date: Option<NaiveDate>,
    pub rank: u32,
    pub rider: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    pub gap_seconds: u64,
    pub overall_time: String,
}

/// Where a stage batch goes: `(race_key, year, stage_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageKey {
    pub race_key: String,
    pub year: i32,
    pub stage_index: usize,
}

/// Destination for complete per-stage batches.
pub trait RecordSink {
    /// Persist one stage's records, returning where they went.
    fn write(&mut self, key: &StageKey, records: &[OutputRecord]) -> Result<PathBuf, PersistError>;
}

/// `<root>/<race_key>/<year>/stage_<NN>.json`, pretty-printed.
pub struct JsonDirSink {
    root: PathBuf,
}

impl JsonDirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonDirSink { root: root.into() }
    }

    pub fn path_for(&self, key: &StageKey) -> PathBuf {
        self.root
            .join(&key.race_key)
            .join(key.year.to_string())
            .join(format!("stage_{:02}.json", key.stage_index))
    }
}

impl RecordSink for JsonDirSink {
    fn write(&mut self, key: &StageKey, records: &[OutputRecord]) -> Result<PathBuf, PersistError> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Whole batch goes to a sibling first so a stage file is never half-written.
        let tmp = path.with_extension("json.tmp");
        write_json(&tmp, records)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}

fn write_json(path: &Path, records: &[OutputRecord]) -> Result<(), PersistError> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
