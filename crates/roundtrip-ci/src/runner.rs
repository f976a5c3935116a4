//! Stage process execution.

use crate::stage::StageConfig;
use async_trait::async_trait;
use roundtrip_core::StageResult;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors raised while launching or supervising a stage process.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("stage {stage} has empty command")]
    EmptyCommand { stage: &'static str },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error while running stage: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes stage commands.
///
/// A timeout is not an error: implementations return a [`StageResult`] with
/// `timed_out` set. Errors are reserved for commands that could not be run.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, config: &StageConfig) -> Result<StageResult, RunnerError>;
}

/// Runs stage commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, config: &StageConfig) -> Result<StageResult, RunnerError> {
        let start = Instant::now();

        let (exe, args) = config
            .command
            .split_first()
            .ok_or(RunnerError::EmptyCommand {
                stage: config.name(),
            })?;

        debug!(
            stage = config.name(),
            command = ?config.command,
            timeout_secs = config.timeout_secs,
            "Executing stage"
        );

        let mut command = Command::new(exe);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down everything the stage forked.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: exe.clone(),
            source,
        })?;
        let pid = child.id();

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let collect = async {
            tokio::try_join!(child.wait(), read_pipe(stdout_pipe), read_pipe(stderr_pipe))
        };

        let output = if config.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(config.timeout_secs), collect)
                .await
                .ok()
                .transpose()?
        } else {
            Some(collect.await?)
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        let Some((status, stdout, stderr)) = output else {
            kill_process_group(pid);
            if let Err(e) = child.kill().await {
                warn!(stage = config.name(), error = %e, "Failed to kill timed out stage");
            }
            warn!(
                stage = config.name(),
                timeout_secs = config.timeout_secs,
                "Stage timed out, process group killed"
            );
            return Ok(StageResult::timeout(config.name(), duration_ms));
        };

        let exit_code = status.code();
        debug!(
            stage = config.name(),
            exit_code = ?exit_code,
            duration_ms,
            "Stage finished"
        );

        Ok(StageResult {
            stage_name: config.name().to_string(),
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration_ms,
            timed_out: false,
        })
    }
}

/// SIGKILL the process group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the child leads its own group.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        debug!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "killpg failed"
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;

    fn shell(script: &str, timeout_secs: u64) -> StageConfig {
        StageConfig::custom(
            StageKind::Decompile,
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            timeout_secs,
        )
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let result = ProcessRunner
            .run(&shell("echo hello", 60))
            .await
            .expect("execute failed");
        assert!(result.passed());
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
        assert_eq!(result.stage_name, "decompile");
    }

    #[tokio::test]
    async fn test_execute_failing_command_captures_stderr() {
        let result = ProcessRunner
            .run(&shell("echo broken >&2; exit 3", 60))
            .await
            .expect("execute failed");
        assert!(!result.passed());
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr.trim(), "broken");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let start = Instant::now();
        let result = ProcessRunner
            .run(&shell("exec sleep 30", 1))
            .await
            .expect("execute failed");
        assert!(result.timed_out);
        assert!(!result.passed());
        assert_eq!(result.exit_code, None);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_background_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = dir.path().join("sleeper.pid");
        let script = format!("sleep 40 & echo $! > '{}'; wait", pidfile.display());

        let result = ProcessRunner
            .run(&shell(&script, 1))
            .await
            .expect("execute failed");
        assert!(result.timed_out);

        let pid = std::fs::read_to_string(&pidfile).unwrap().trim().to_string();
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Gone, or a zombie waiting for init to reap it.
        let alive = match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => !stat.contains(") Z "),
            Err(_) => false,
        };
        assert!(!alive, "background sleep {pid} outlived the stage timeout");
    }

    #[tokio::test]
    async fn test_zero_timeout_waits_for_completion() {
        let result = ProcessRunner
            .run(&shell("exit 0", 0))
            .await
            .expect("execute failed");
        assert!(result.passed());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let config = StageConfig::custom(
            StageKind::Compile,
            vec!["/nonexistent/roundtrip-compiler".to_string()],
            5,
        );
        let err = ProcessRunner.run(&config).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/roundtrip-compiler"));
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let config = StageConfig::custom(StageKind::Compile, vec![], 5);
        let err = ProcessRunner.run(&config).await.unwrap_err();
        assert!(matches!(err, RunnerError::EmptyCommand { stage: "compile" }));
    }
}
