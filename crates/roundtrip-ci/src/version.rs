//! Best-effort compiler version lookup.

use crate::runner::CommandRunner;
use crate::stage::StageConfig;
use std::path::Path;
use tracing::debug;

pub const UNKNOWN_VERSION: &str = "unknown version";

/// Ask the compiler for its version with `-v`, through `launcher` if given.
///
/// Falls back to stderr when stdout is empty, and to [`UNKNOWN_VERSION`] on
/// any error. Never fails.
pub async fn detect_compiler_version(
    runner: &dyn CommandRunner,
    launcher: &[String],
    compiler: &Path,
) -> String {
    let config = StageConfig::version(launcher, compiler);

    match runner.run(&config).await {
        Ok(result) if !result.timed_out => {
            let stdout = result.stdout.trim();
            let stderr = result.stderr.trim();
            if !stdout.is_empty() {
                stdout.to_string()
            } else if !stderr.is_empty() {
                stderr.to_string()
            } else {
                UNKNOWN_VERSION.to_string()
            }
        }
        Ok(_) => {
            debug!(compiler = %compiler.display(), "Version lookup timed out");
            UNKNOWN_VERSION.to_string()
        }
        Err(e) => {
            debug!(compiler = %compiler.display(), error = %e, "Version lookup failed");
            UNKNOWN_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunnerError;
    use crate::stage::StageKind;
    use async_trait::async_trait;
    use roundtrip_core::StageResult;

    struct Canned(Result<StageResult, ()>);

    #[async_trait]
    impl CommandRunner for Canned {
        async fn run(&self, config: &StageConfig) -> Result<StageResult, RunnerError> {
            assert_eq!(config.kind, StageKind::Version);
            assert_eq!(config.command.last().map(String::as_str), Some("-v"));
            self.0.clone().map_err(|_| RunnerError::EmptyCommand { stage: "version" })
        }
    }

    fn output(stdout: &str, stderr: &str) -> StageResult {
        StageResult {
            stage_name: "version".to_string(),
            exit_code: Some(1),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration_ms: 1,
            timed_out: false,
        }
    }

    #[tokio::test]
    async fn test_prefers_stdout() {
        let runner = Canned(Ok(output("Lua 5.4.7  Copyright (C) 1994-2024\n", "noise")));
        let version = detect_compiler_version(&runner, &[], Path::new("luac")).await;
        assert_eq!(version, "Lua 5.4.7  Copyright (C) 1994-2024");
    }

    #[tokio::test]
    async fn test_falls_back_to_stderr() {
        let runner = Canned(Ok(output("  ", "Lua 5.1.5\n")));
        assert_eq!(
            detect_compiler_version(&runner, &[], Path::new("luac")).await,
            "Lua 5.1.5"
        );
    }

    #[tokio::test]
    async fn test_unknown_on_error_or_silence() {
        let silent = Canned(Ok(output("", "")));
        assert_eq!(
            detect_compiler_version(&silent, &[], Path::new("luac")).await,
            UNKNOWN_VERSION
        );

        let broken = Canned(Err(()));
        assert_eq!(
            detect_compiler_version(&broken, &[], Path::new("luac")).await,
            UNKNOWN_VERSION
        );

        let slow = Canned(Ok(StageResult::timeout("version", 5_000)));
        assert_eq!(
            detect_compiler_version(&slow, &[], Path::new("luac")).await,
            UNKNOWN_VERSION
        );
    }
}
