//! Stage definitions and command construction.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The two stages every fixture goes through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// `[launcher...] <compiler> -o <artifact> <fixture>`
    Compile,

    /// `<runtime...> <decompiler> <artifact>`
    Decompile,

    /// `[launcher...] <compiler> -v`
    Version,
}

impl StageKind {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Compile => "compile",
            StageKind::Decompile => "decompile",
            StageKind::Version => "version",
        }
    }

    /// Default timeout; decompilation gets twice the compile budget.
    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            StageKind::Compile => 30,
            StageKind::Decompile => 60,
            StageKind::Version => 5,
        }
    }
}

/// A fully resolved command for one stage invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageConfig {
    /// Which stage this is.
    pub kind: StageKind,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Timeout in seconds. Zero disables the deadline.
    pub timeout_secs: u64,
}

impl StageConfig {
    /// Compile `fixture` into `artifact`.
    ///
    /// A non-empty `launcher` (e.g. `sh` or `wine`) is placed in front of the
    /// compiler.
    pub fn compile(
        launcher: &[String],
        compiler: &Path,
        fixture: &Path,
        artifact: &Path,
        timeout_secs: u64,
    ) -> Self {
        let mut command = launcher.to_vec();
        command.extend([
            path_arg(compiler),
            "-o".to_string(),
            path_arg(artifact),
            path_arg(fixture),
        ]);
        Self {
            kind: StageKind::Compile,
            command,
            timeout_secs,
        }
    }

    /// Ask the compiler for its version banner.
    pub fn version(launcher: &[String], compiler: &Path) -> Self {
        let mut command = launcher.to_vec();
        command.extend([path_arg(compiler), "-v".to_string()]);
        Self {
            kind: StageKind::Version,
            command,
            timeout_secs: StageKind::Version.default_timeout_secs(),
        }
    }

    /// Decompile `artifact` with the decompiler, launched through `runtime`.
    ///
    /// An empty runtime runs the decompiler directly.
    pub fn decompile(
        runtime: &[String],
        decompiler: &Path,
        artifact: &Path,
        timeout_secs: u64,
    ) -> Self {
        let mut command = runtime.to_vec();
        command.push(path_arg(decompiler));
        command.push(path_arg(artifact));
        Self {
            kind: StageKind::Decompile,
            command,
            timeout_secs,
        }
    }

    /// Create a custom stage configuration.
    pub fn custom(kind: StageKind, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            kind,
            command,
            timeout_secs,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
