//! roundtrip - decompiler round-trip regression harness
//!
//! Compiles every fixture with the reference compiler, decompiles the result
//! with the decompiler under test, and exits 1 if any fixture failed to
//! decompile. Fixtures that do not compile are skipped and never fail the run.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use roundtrip_ci::{
    detect_compiler_version, Gate, Pipeline, PipelineSettings, ProcessRunner, Reporter, RunReport,
};
use roundtrip_core::{discover_fixtures, CorpusSpec, Fixture, HarnessError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "roundtrip")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Round-trip test fixtures through a compiler and the decompiler under test", long_about = None)]
#[command(after_help = "Example:\n  roundtrip /opt/lua-5.4.7/src/luac\n  roundtrip --jobs 8 --decompiler build/unluac.jar $(which luac)")]
struct Cli {
    /// Path to the compiler executable (e.g. luac)
    compiler: PathBuf,

    /// Launcher for the compiler (e.g. "wine"); empty runs it directly
    #[arg(long, env = "ROUNDTRIP_COMPILER_LAUNCHER", default_value = "")]
    compiler_launcher: String,

    /// Project root that default paths are resolved against
    #[arg(long, env = "ROUNDTRIP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Decompiler artifact under test (default: <root>/unluac.jar)
    #[arg(long, env = "ROUNDTRIP_DECOMPILER")]
    decompiler: Option<PathBuf>,

    /// Launcher for the decompiler artifact; empty runs it directly
    #[arg(long, env = "ROUNDTRIP_RUNTIME", default_value = "java -jar")]
    runtime: String,

    /// Directory containing fixtures (default: <root>/test/src)
    #[arg(long, env = "ROUNDTRIP_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Directory for compiled artifacts and report.json (default: <root>/test/out)
    #[arg(long, env = "ROUNDTRIP_OUT")]
    out: Option<PathBuf>,

    /// Fixture file extension
    #[arg(long, default_value = "lua")]
    fixture_ext: String,

    /// Compiled artifact file extension
    #[arg(long, default_value = "luac")]
    artifact_ext: String,

    /// Compile stage timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    compile_timeout: u64,

    /// Decompile stage timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    decompile_timeout: u64,

    /// Number of fixtures to process concurrently
    #[arg(short, long, env = "ROUNDTRIP_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Do not write report.json
    #[arg(long)]
    no_report: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

/// Everything a run needs, with defaults resolved against `--root`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunConfig {
    settings: PipelineSettings,
    fixture_dir: PathBuf,
    fixture_ext: String,
    write_report: bool,
}

impl RunConfig {
    fn from_cli(cli: &Cli) -> Self {
        let root = &cli.root;
        let decompiler = cli
            .decompiler
            .clone()
            .unwrap_or_else(|| root.join("unluac.jar"));
        let out_dir = cli
            .out
            .clone()
            .unwrap_or_else(|| root.join("test").join("out"));
        let fixture_dir = cli
            .fixtures
            .clone()
            .unwrap_or_else(|| root.join("test").join("src"));

        let mut settings = PipelineSettings::new(cli.compiler.clone(), decompiler, out_dir);
        settings.compiler_launcher = split_words(&cli.compiler_launcher);
        settings.runtime = split_words(&cli.runtime);
        settings.artifact_ext = cli.artifact_ext.clone();
        settings.compile_timeout_secs = cli.compile_timeout;
        settings.decompile_timeout_secs = cli.decompile_timeout;
        settings.jobs = cli.jobs.max(1);

        Self {
            settings,
            fixture_dir,
            fixture_ext: cli.fixture_ext.clone(),
            write_report: !cli.no_report,
        }
    }
}

fn split_words(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Startup checks. Any failure here aborts before a fixture is touched.
fn check_preconditions(config: &RunConfig) -> Result<Vec<Fixture>, HarnessError> {
    let settings = &config.settings;
    if !settings.compiler.exists() {
        return Err(HarnessError::CompilerNotFound {
            path: settings.compiler.clone(),
        });
    }
    if !settings.decompiler.exists() {
        return Err(HarnessError::DecompilerNotFound {
            path: settings.decompiler.clone(),
        });
    }
    discover_fixtures(&config.fixture_dir, &config.fixture_ext)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    roundtrip_core::telemetry::init_tracing(cli.json, level);

    let result = run(RunConfig::from_cli(&cli), &mut std::io::stdout()).await;
    ExitCode::from(finish(result, &mut std::io::stderr()))
}

/// Turn the result of a run into the process exit code, printing fatal
/// errors and their hint to `err`.
fn finish(result: Result<u8>, err: &mut dyn Write) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            if let Err(io) = print_error(&e, err) {
                warn!(error = %io, "Could not print fatal error");
            }
            1
        }
    }
}

fn print_error(e: &anyhow::Error, err: &mut dyn Write) -> std::io::Result<()> {
    writeln!(err, "error: {e:#}")?;
    if let Some(hint) = e.downcast_ref::<HarnessError>().and_then(HarnessError::hint) {
        writeln!(err, "hint: {hint}")?;
    }
    Ok(())
}

/// Run the harness, printing the report to `out`, and return the exit code.
async fn run(config: RunConfig, out: &mut dyn Write) -> Result<u8> {
    let started_at = Utc::now();
    let fixtures = check_preconditions(&config)?;

    let runner = Arc::new(ProcessRunner);
    let settings = config.settings.clone();
    let compiler_version = detect_compiler_version(
        runner.as_ref(),
        &settings.compiler_launcher,
        &settings.compiler,
    )
    .await;

    let corpus = CorpusSpec::new(
        config.fixture_dir.clone(),
        &fixtures,
        settings.compiler.clone(),
        compiler_version,
        settings.decompiler.clone(),
    );
    info!(digest = corpus.short_digest(), fixtures = fixtures.len(), "Corpus loaded");

    let reporter = Reporter;
    writeln!(out, "{}", reporter.header(&corpus)).context("failed to write report header")?;

    let out_dir = settings.out_dir.clone();
    let pipeline = Pipeline::new(runner, settings);
    let mut progress_error = None;
    let outcome = pipeline
        .run(&fixtures, |index, total, fixture, verdict| {
            if progress_error.is_some() {
                return;
            }
            let line = reporter.progress_line(index, total, &fixture.id, verdict);
            if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
                progress_error = Some(e);
            }
        })
        .await
        .context("round-trip run failed")?;
    if let Some(e) = progress_error {
        return Err(e).context("failed to write progress line");
    }

    writeln!(out, "{}", reporter.summary(&outcome.aggregate))
        .context("failed to write summary")?;

    let gate = Gate::evaluate(&outcome.aggregate);
    info!(passed = gate.passed, "{}", gate.message);

    if config.write_report {
        let path = out_dir.join("report.json");
        let report = RunReport::new(corpus, started_at, outcome, gate.clone());
        match report.write_json(&path) {
            Ok(()) => info!(path = %path.display(), "Wrote run report"),
            Err(e) => {
                let error = format!("{e:#}");
                warn!(error = %error, "Could not write run report");
            }
        }
    }

    Ok(gate.exit_code)
}
