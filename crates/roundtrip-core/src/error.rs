//! Environment error taxonomy.
//!
//! These are the only errors that abort a run. Anything that goes wrong while
//! processing a single fixture is turned into a [`crate::Verdict`] instead.

use std::path::PathBuf;

/// Fatal startup errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("compiler not found: {}", path.display())]
    CompilerNotFound { path: PathBuf },

    #[error("decompiler artifact not found: {}", path.display())]
    DecompilerNotFound { path: PathBuf },

    #[error("fixture directory not found: {}", path.display())]
    FixtureDirNotFound { path: PathBuf },

    #[error("no *.{extension} fixtures found in {}", dir.display())]
    NoFixtures { dir: PathBuf, extension: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Short corrective hint shown under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            HarnessError::CompilerNotFound { .. } => {
                Some("pass the path to the compiler executable as the first argument")
            }
            HarnessError::DecompilerNotFound { .. } => {
                Some("build the decompiler first or point --decompiler at the artifact")
            }
            HarnessError::FixtureDirNotFound { .. } | HarnessError::NoFixtures { .. } => {
                Some("point --fixtures at a directory containing test sources")
            }
            HarnessError::Io(_) => None,
        }
    }
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fixtures_displays_extension_and_dir() {
        let err = HarnessError::NoFixtures {
            dir: PathBuf::from("test/src"),
            extension: "lua".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("*.lua"));
        assert!(msg.contains("test/src"));
    }

    #[test]
    fn test_hint_present_for_environment_errors() {
        let err = HarnessError::CompilerNotFound {
            path: PathBuf::from("/missing/luac"),
        };
        assert!(err.to_string().contains("/missing/luac"));
        assert!(err.hint().is_some());

        let io = HarnessError::from(std::io::Error::other("boom"));
        assert!(io.hint().is_none());
    }
}
