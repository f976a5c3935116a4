//! Round-trip pipeline orchestration.
//!
//! Each fixture is compiled, then decompiled. Up to `jobs` fixtures are in
//! flight at once, but verdicts are handed to the caller strictly in discovery
//! order, so progress output and the aggregate do not depend on `jobs`.

use crate::runner::CommandRunner;
use crate::stage::{StageConfig, StageKind};
use anyhow::Context;
use futures::stream::{self, StreamExt};
use roundtrip_core::{classify_compile, classify_decompile, AggregateReport, Fixture, Verdict};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Resolved configuration for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Compiler executable.
    pub compiler: PathBuf,

    /// Launcher prepended to the compiler, e.g. `wine`. Usually empty.
    pub compiler_launcher: Vec<String>,

    /// Decompiler artifact under test.
    pub decompiler: PathBuf,

    /// Launcher prepended to the decompiler, e.g. `java -jar`.
    pub runtime: Vec<String>,

    /// Directory compiled artifacts are written to.
    pub out_dir: PathBuf,

    /// Extension of compiled artifacts.
    pub artifact_ext: String,

    pub compile_timeout_secs: u64,
    pub decompile_timeout_secs: u64,

    /// Maximum fixtures processed concurrently.
    pub jobs: usize,
}

impl PipelineSettings {
    /// Settings with no compiler launcher, the stock `java -jar` runtime,
    /// `luac` artifacts, default timeouts and a single worker.
    pub fn new(compiler: PathBuf, decompiler: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            compiler,
            compiler_launcher: Vec::new(),
            decompiler,
            runtime: vec!["java".to_string(), "-jar".to_string()],
            out_dir,
            artifact_ext: "luac".to_string(),
            compile_timeout_secs: StageKind::Compile.default_timeout_secs(),
            decompile_timeout_secs: StageKind::Decompile.default_timeout_secs(),
            jobs: 1,
        }
    }
}

/// Verdict for one fixture, numbered in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRecord {
    /// 1-based position in discovery order.
    pub index: usize,
    pub fixture_id: String,
    pub verdict: Verdict,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub records: Vec<FixtureRecord>,
    pub aggregate: AggregateReport,
    pub duration_ms: u64,
}

/// Compile/decompile pipeline over a fixture corpus.
pub struct Pipeline {
    runner: Arc<dyn CommandRunner>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: PipelineSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Round-trip one fixture. Never fails: every problem becomes a verdict.
    pub async fn run_fixture(&self, fixture: &Fixture) -> Verdict {
        let settings = &self.settings;
        let artifact = fixture.artifact_path(&settings.out_dir, &settings.artifact_ext);

        let compile = StageConfig::compile(
            &settings.compiler_launcher,
            &settings.compiler,
            &fixture.source,
            &artifact,
            settings.compile_timeout_secs,
        );
        match self.runner.run(&compile).await {
            Ok(result) => {
                if let Some(skip) = classify_compile(&result) {
                    info!(fixture = %fixture.id, verdict = ?skip, "Fixture skipped");
                    return skip;
                }
            }
            Err(e) => {
                info!(fixture = %fixture.id, error = %e, "Compiler could not be launched");
                return Verdict::compile_error(e);
            }
        }

        let decompile = StageConfig::decompile(
            &settings.runtime,
            &settings.decompiler,
            &artifact,
            settings.decompile_timeout_secs,
        );
        let verdict = match self.runner.run(&decompile).await {
            Ok(result) => classify_decompile(&result),
            Err(e) => Verdict::decompile_error(e),
        };
        debug!(fixture = %fixture.id, verdict = ?verdict, "Fixture classified");
        verdict
    }

    /// Run every fixture and fold the verdicts.
    ///
    /// `on_verdict(index, total, fixture, verdict)` is called once per fixture,
    /// in discovery order, as soon as that fixture and all earlier ones are done.
    pub async fn run<F>(
        &self,
        fixtures: &[Fixture],
        mut on_verdict: F,
    ) -> anyhow::Result<RunOutcome>
    where
        F: FnMut(usize, usize, &Fixture, &Verdict),
    {
        let start = Instant::now();
        let total = fixtures.len();
        let jobs = self.settings.jobs.max(1);

        tokio::fs::create_dir_all(&self.settings.out_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create output directory {}",
                    self.settings.out_dir.display()
                )
            })?;

        info!(fixtures = total, jobs, "Starting round-trip run");

        let mut verdicts = stream::iter(fixtures)
            .map(|fixture| async move { (fixture, self.run_fixture(fixture).await) })
            .buffered(jobs);

        let mut aggregate = AggregateReport::new();
        let mut records = Vec::with_capacity(total);
        while let Some((fixture, verdict)) = verdicts.next().await {
            let index = records.len() + 1;
            on_verdict(index, total, fixture, &verdict);
            aggregate = aggregate.record(&fixture.id, &verdict);
            records.push(FixtureRecord {
                index,
                fixture_id: fixture.id.clone(),
                verdict,
            });
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            passed = aggregate.passed,
            failed = aggregate.failed,
            skipped = aggregate.skipped,
            duration_ms,
            "Round-trip run finished"
        );

        Ok(RunOutcome {
            records,
            aggregate,
            duration_ms,
        })
    }
}
