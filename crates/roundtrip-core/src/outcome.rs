//! Result of one external-process invocation.

use serde::{Deserialize, Serialize};

/// Captured outcome of running a stage command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code; `None` when the process was killed or died from a signal.
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the stage hit its deadline and was killed.
    pub timed_out: bool,
}

impl StageResult {
    /// Whether this stage passed (finished in time with exit code 0).
    pub fn passed(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Result for a stage that was killed at its deadline.
    pub fn timeout(stage_name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage_name: stage_name.into(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms,
            timed_out: true,
        }
    }
}
