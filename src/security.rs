use crate::{config::Config, errors::{AppError, AppResult}};
use axum::http::HeaderValue;
use std::collections::VecDeque;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Confines caller-supplied paths to a canonical root directory.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        Ok(Self { root: dunce::canonicalize(root)? })
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Resolves `relative` against the root. The target need not exist, but
    /// whatever exists of it is canonicalized before the containment check.
    pub fn resolve(&self, relative: &str) -> AppResult<PathBuf> {
        match resolve_lenient(&self.root.join(relative)) {
            Some(resolved) if self.contains(&resolved) => Ok(resolved),
            _ => Err(AppError::InvalidPath),
        }
    }

    /// True when `path` resolves to the root or somewhere beneath it.
    pub fn encloses(&self, path: &Path) -> bool {
        resolve_lenient(path).map_or(false, |p| self.contains(&p))
    }

    // component-wise, so a sibling like `<root>2` never matches
    fn contains(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }
}

const MAX_LINK_HOPS: usize = 40;

/// Canonicalizes component by component. A component that cannot be
/// canonicalized is followed by hand if it is a symlink (dangling links
/// included), otherwise applied lexically, with `..` popping the previous
/// component. `None` when links nest deeper than `MAX_LINK_HOPS` or cannot be read.
fn resolve_lenient(path: &Path) -> Option<PathBuf> {
    let mut pending: VecDeque<PathBuf> = path.components().map(|c| PathBuf::from(c.as_os_str())).collect();
    let mut resolved = PathBuf::new();
    let mut hops = 0usize;
    while let Some(part) = pending.pop_front() {
        match part.components().next() {
            Some(Component::Prefix(_)) | Some(Component::RootDir) => resolved.push(&part),
            Some(Component::CurDir) | None => {}
            Some(Component::ParentDir) => {
                resolved.pop();
            }
            Some(Component::Normal(_)) => {
                resolved.push(&part);
                if let Ok(canon) = dunce::canonicalize(&resolved) {
                    resolved = canon;
                    continue;
                }
                let is_link = fs::symlink_metadata(&resolved).map(|m| m.file_type().is_symlink()).unwrap_or(false);
                if !is_link {
                    continue;
                }
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    return None;
                }
                let target = fs::read_link(&resolved).ok()?;
                resolved.pop();
                // an absolute target starts with RootDir and replaces `resolved`
                for c in target.components().rev() {
                    pending.push_front(PathBuf::from(c.as_os_str()));
                }
            }
        }
    }
    Some(resolved)
}

pub fn cors_layer(cfg: &Config) -> anyhow::Result<CorsLayer> {
    if cfg.allows_any_origin() {
        // mirrors the request origin so credentialed requests are accepted too
        return Ok(CorsLayer::very_permissive());
    }
    let origins = cfg
        .cors
        .allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("invalid origin {o:?}: {e}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
