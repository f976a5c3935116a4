//! Per-fixture verdicts and the stage outcome classifier.
//!
//! The decompiler's internal consistency checks throw an
//! `IllegalStateException` whose message has the shape `given: X, expected: Y`.
//! When that exception shows up on stderr the classifier surfaces the single
//! line carrying the message, which turns a stack trace into a one-line
//! regression signature.

use crate::outcome::StageResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker of the decompiler's internal-state exception.
pub const STATE_EXCEPTION_MARKER: &str = "IllegalStateException";

/// Diagnostic used when a failing decompile wrote nothing to stderr.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Maximum diagnostic length, in characters, for free-form stderr.
pub const DIAGNOSTIC_MAX_CHARS: usize = 100;

pub const COMPILE_TIMEOUT: &str = "compile timeout";
pub const DECOMPILE_TIMEOUT: &str = "decompile timeout";

const MESSAGE_KEYS: [&str; 2] = ["given:", "expected:"];

/// Classified result for one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    /// The fixture did not compile; it says nothing about the decompiler.
    Skipped(String),

    /// The decompiler completed without error.
    Passed,

    /// The decompiler failed; carries a one-line diagnostic.
    Failed(String),
}

impl Verdict {
    /// Verdict for a compiler that could not be launched.
    pub fn compile_error(err: impl fmt::Display) -> Self {
        Verdict::Skipped(format!("compile error: {err}"))
    }

    /// Verdict for a decompiler that could not be launched.
    pub fn decompile_error(err: impl fmt::Display) -> Self {
        Verdict::Failed(format!("decompile error: {err}"))
    }

    /// Progress tag: `SKIP`, ` OK `, or `FAIL`.
    pub fn tag(&self) -> &'static str {
        match self {
            Verdict::Skipped(_) => "SKIP",
            Verdict::Passed => " OK ",
            Verdict::Failed(_) => "FAIL",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Verdict::Failed(_))
    }
}

/// Classify a compile stage result.
///
/// Returns `None` when compilation succeeded and the fixture should proceed to
/// decompilation, or `Some(Verdict::Skipped)` otherwise.
pub fn classify_compile(result: &StageResult) -> Option<Verdict> {
    if result.timed_out {
        return Some(Verdict::Skipped(COMPILE_TIMEOUT.to_string()));
    }
    if result.passed() {
        return None;
    }

    let stderr = result.stderr.trim();
    let reason = if stderr.is_empty() {
        match result.exit_code {
            Some(code) => format!("compile failed with exit code {code}"),
            None => "compile failed: terminated by signal".to_string(),
        }
    } else {
        format!("compile failed: {stderr}")
    };
    Some(Verdict::Skipped(reason))
}

/// Classify a decompile stage result.
pub fn classify_decompile(result: &StageResult) -> Verdict {
    if result.timed_out {
        return Verdict::Failed(DECOMPILE_TIMEOUT.to_string());
    }
    if result.exit_code == Some(0) {
        return Verdict::Passed;
    }
    Verdict::Failed(extract_diagnostic(&result.stderr))
}

/// Reduce decompiler stderr to a one-line diagnostic.
pub fn extract_diagnostic(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }

    if stderr.contains(STATE_EXCEPTION_MARKER) {
        return stderr
            .lines()
            .find(|line| MESSAGE_KEYS.iter().any(|key| line.contains(key)))
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| STATE_EXCEPTION_MARKER.to_string());
    }

    stderr.chars().take(DIAGNOSTIC_MAX_CHARS).collect()
}
