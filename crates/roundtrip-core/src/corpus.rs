//! Corpus provenance.
//!
//! Identifies which fixtures and tools a run used, so reports from two runs
//! can be matched up.

use crate::fixture::Fixture;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Inputs a run was performed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSpec {
    /// Directory fixtures were discovered in.
    pub fixture_dir: PathBuf,

    /// SHA-256 of the ordered fixture ids.
    pub fixtures_digest: String,

    /// Number of fixtures discovered.
    pub fixture_count: usize,

    /// Compiler executable.
    pub compiler: PathBuf,

    /// Version string reported by the compiler.
    pub compiler_version: String,

    /// Decompiler artifact under test.
    pub decompiler: PathBuf,
}

impl CorpusSpec {
    pub fn new(
        fixture_dir: PathBuf,
        fixtures: &[Fixture],
        compiler: PathBuf,
        compiler_version: String,
        decompiler: PathBuf,
    ) -> Self {
        Self {
            fixture_dir,
            fixtures_digest: compute_fixtures_digest(fixtures),
            fixture_count: fixtures.len(),
            compiler,
            compiler_version,
            decompiler,
        }
    }

    /// First 12 hex digits of the fixture digest.
    pub fn short_digest(&self) -> &str {
        &self.fixtures_digest[..12.min(self.fixtures_digest.len())]
    }
}

/// Deterministic digest of ordered fixture ids.
fn compute_fixtures_digest(fixtures: &[Fixture]) -> String {
    let mut hasher = Sha256::new();
    for fixture in fixtures {
        hasher.update(fixture.id.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
