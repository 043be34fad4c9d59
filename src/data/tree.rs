use super::{ensure_dir, sorted_entries};
use crate::{errors::AppResult, security::PathGuard};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Zones and their sub-zones under an option directory.
#[derive(Debug, Serialize, PartialEq)]
pub struct DirTree {
    pub url: String,
    pub zones: BTreeMap<String, Vec<String>>,
}

/// Lists two levels of subdirectories under `dir`. `url` is echoed back as given.
pub fn scan(guard: &PathGuard, dir: &Path, url: &str) -> AppResult<DirTree> {
    ensure_dir(dir, "Data directory not found")?;
    let mut zones = BTreeMap::new();
    for (zone, zone_path) in sorted_entries(guard, dir, Path::is_dir)? {
        let subs = sorted_entries(guard, &zone_path, Path::is_dir)?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        zones.insert(zone, subs);
    }
    Ok(DirTree { url: url.to_string(), zones })
}
