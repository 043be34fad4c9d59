pub mod runs;
pub mod tabular;
pub mod tree;

use crate::{errors::{AppError, AppResult}, security::PathGuard};
use std::fs;
use std::path::{Path, PathBuf};

/// Fails with `NotFound(what)` unless `path` is an existing directory.
pub fn ensure_dir(path: &Path, what: &'static str) -> AppResult<()> {
    if path.is_dir() { Ok(()) } else { Err(AppError::NotFound(what)) }
}

/// Immediate entries of `dir` accepted by `keep`, sorted by file name.
/// Entries that resolve outside the guarded root are skipped.
pub fn sorted_entries(guard: &PathGuard, dir: &Path, keep: impl Fn(&Path) -> bool) -> AppResult<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !keep(&path) {
            continue;
        }
        if !guard.encloses(&path) {
            tracing::warn!(path = %path.display(), "skipping entry that leaves the data root");
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        out.push((name, path));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
