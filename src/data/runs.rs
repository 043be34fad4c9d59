//! Groups per-run logbook files of one simulation folder into a data pack.

use super::{
    ensure_dir, sorted_entries,
    tabular::{read_rows, Row, COLUMNAR_EXTENSION, PASSENGER_COLUMNS, TIMELINE_COLUMNS},
};
use crate::{errors::AppResult, security::PathGuard};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Level identifier given to timeline files without a level suffix.
pub const ALL_LEVELS: &str = "all";

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DataPack {
    /// level id -> run name -> rows
    #[serde(rename = "TimelineLogbooks")]
    pub timeline_logbooks: BTreeMap<String, BTreeMap<String, Vec<Row>>>,
    /// run name -> rows
    #[serde(rename = "PassengerLogbooks")]
    pub passenger_logbooks: BTreeMap<String, Vec<Row>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogbookKind {
    Timeline,
    Passenger,
}

impl LogbookKind {
    /// Substring match on the file name; timeline wins when both markers appear.
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.contains("timeline_logbook") {
            Some(LogbookKind::Timeline)
        } else if file_name.contains("passenger_logbook") {
            Some(LogbookKind::Passenger)
        } else {
            None
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            LogbookKind::Timeline => TIMELINE_COLUMNS,
            LogbookKind::Passenger => PASSENGER_COLUMNS,
        }
    }
}

/// `timeline_logbook.feather` -> `all`; `timeline_logbook_L2.feather` -> `L2`.
pub fn level_id(file_name: &str) -> String {
    let segments: Vec<&str> = file_name.split('_').collect();
    if segments.len() == 2 {
        return ALL_LEVELS.to_string();
    }
    let last = segments.last().copied().unwrap_or_default();
    last.split('.').next().unwrap_or_default().to_string()
}

fn is_columnar_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(COLUMNAR_EXTENSION))
            .unwrap_or(false)
}

/// Reads every run directory under `sim_dir`. Unrecognized files are ignored;
/// a recognized file that cannot be read fails the whole pack.
pub fn aggregate(guard: &PathGuard, sim_dir: &Path) -> AppResult<DataPack> {
    ensure_dir(sim_dir, "Directory not found")?;
    let mut pack = DataPack::default();
    for (run, run_path) in sorted_entries(guard, sim_dir, Path::is_dir)? {
        for (file_name, file_path) in sorted_entries(guard, &run_path, is_columnar_file)? {
            let Some(kind) = LogbookKind::classify(&file_name) else {
                tracing::debug!(run = %run, file = %file_name, "ignoring unrecognized file");
                continue;
            };
            let rows = read_rows(&file_path, kind.columns())?;
            match kind {
                LogbookKind::Timeline => {
                    pack.timeline_logbooks
                        .entry(level_id(&file_name))
                        .or_default()
                        .insert(run.clone(), rows);
                }
                LogbookKind::Passenger => {
                    pack.passenger_logbooks.insert(run.clone(), rows);
                }
            }
        }
    }
    Ok(pack)
}
