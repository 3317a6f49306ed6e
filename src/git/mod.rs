//! Local repository discovery
//!
//! Recognises clones that already exist on disk so they can be tracked in
//! the configuration store. Uses libgit2 rather than shelling out to git.

use git2::Repository;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::store::RepositoryRecord;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("{} is not a git repository: {source}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("Cannot name repository at {}", path.display())]
    Unnamed { path: PathBuf },
    #[error("Failed to scan {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Opens `path` as a repository and returns its working directory
pub fn inspect(path: &Path) -> Result<PathBuf, DiscoveryError> {
    let repo = Repository::open(path).map_err(|source| DiscoveryError::NotARepository {
        path: path.to_path_buf(),
        source,
    })?;
    let root = repo.workdir().unwrap_or_else(|| repo.path());
    Ok(root.canonicalize().unwrap_or_else(|_| root.to_path_buf()))
}

/// Builds a record for the clone at `path`, named after its directory
/// unless `name` is given
pub fn record_for(path: &Path, name: Option<&str>) -> Result<RepositoryRecord, DiscoveryError> {
    let root = inspect(path)?;
    let name = match name {
        Some(name) => name.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().trim_end_matches(".git").to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DiscoveryError::Unnamed { path: root.clone() })?,
    };
    Ok(RepositoryRecord::new(name, root))
}

/// Every immediate sub-directory of `root` that is a repository
pub fn discover(root: &Path) -> Result<Vec<RepositoryRecord>, DiscoveryError> {
    let io_error = |source| DiscoveryError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut records = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_dir() {
            continue;
        }
        match record_for(&path, None) {
            Ok(record) => records.push(record),
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping directory"),
        }
    }
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}
