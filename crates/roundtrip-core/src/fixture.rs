//! Fixture discovery.

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One source file fed through the compile and decompile stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// File name without extension.
    pub id: String,

    /// Path to the source file.
    pub source: PathBuf,
}

impl Fixture {
    /// Build a fixture from a source path, deriving the id from its file stem.
    pub fn from_path(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let id = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, source }
    }

    /// Deterministic location of the compiled artifact for this fixture.
    pub fn artifact_path(&self, out_dir: &Path, artifact_ext: &str) -> PathBuf {
        out_dir.join(format!("{}.{}", self.id, artifact_ext))
    }
}

/// List the fixtures in `dir` with the given extension, sorted by file name.
///
/// Only direct children that are files (or links to files) are considered;
/// dotfiles are ignored the way a shell glob ignores them.
/// Fails when the directory is missing or holds no matching file.
pub fn discover_fixtures(dir: &Path, extension: &str) -> Result<Vec<Fixture>> {
    if !dir.is_dir() {
        return Err(HarnessError::FixtureDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || is_hidden(&path) {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(HarnessError::NoFixtures {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = paths.len(), "Discovered fixtures");

    Ok(paths.into_iter().map(Fixture::from_path).collect())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
