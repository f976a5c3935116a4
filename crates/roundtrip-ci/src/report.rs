//! Console and JSON reporting.
//!
//! Provides two outputs:
//! - `Reporter` — the human-readable header, progress lines and summary
//! - `RunReport` — machine-readable run record written as `report.json`

use crate::gate::GateVerdict;
use crate::pipeline::{FixtureRecord, RunOutcome};
use anyhow::Context;
use chrono::{DateTime, Utc};
use roundtrip_core::{AggregateReport, CorpusSpec, Verdict};
use serde::{Deserialize, Serialize};
use std::path::Path;

const RULE_WIDTH: usize = 60;

// ── console output ────────────────────────────────────────────────────────

/// Renders the text the harness prints to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter;

impl Reporter {
    /// Banner with provenance of the tools and corpus.
    pub fn header(&self, corpus: &CorpusSpec) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        out.push_str(&format!("{heavy}\nroundtrip decompiler test\n{heavy}\n"));
        out.push_str(&format!("compiler: {}\n", corpus.compiler.display()));
        out.push_str(&format!("compiler version: {}\n", corpus.compiler_version));
        out.push_str(&format!("decompiler: {}\n", corpus.decompiler.display()));
        out.push_str(&format!("fixture dir: {}\n", corpus.fixture_dir.display()));
        out.push_str(&format!("{heavy}\n\n"));
        out.push_str(&format!("Found {} fixtures\n", corpus.fixture_count));
        out.push_str(&"-".repeat(RULE_WIDTH));
        out
    }

    /// One numbered progress line, e.g. `[  3/12] [FAIL] loop - given: 3`.
    pub fn progress_line(
        &self,
        index: usize,
        total: usize,
        fixture_id: &str,
        verdict: &Verdict,
    ) -> String {
        match verdict {
            Verdict::Failed(diagnostic) => format!(
                "[{index:3}/{total}] [{}] {fixture_id} - {diagnostic}",
                verdict.tag()
            ),
            _ => format!("[{index:3}/{total}] [{}] {fixture_id}", verdict.tag()),
        }
    }

    /// Totals, followed by the itemized failures when there are any.
    pub fn summary(&self, report: &AggregateReport) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        out.push_str(&format!("\n{heavy}\nResults\n{heavy}\n"));
        out.push_str(&format!("Passed: {}\n", report.passed));
        out.push_str(&format!("Failed: {}\n", report.failed));
        out.push_str(&format!("Skipped: {}\n", report.skipped));
        out.push_str(&format!("Total: {}\n", report.total));
        out.push_str(&heavy);

        if !report.failures.is_empty() {
            out.push_str("\n\nFailed fixtures:\n");
            out.push_str(&"-".repeat(RULE_WIDTH));
            for failure in &report.failures {
                out.push_str(&format!(
                    "\n  {}: {}",
                    failure.fixture_id, failure.diagnostic
                ));
            }
        }
        out
    }
}

// ── report.json ───────────────────────────────────────────────────────────

/// Everything known about a finished run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub corpus: CorpusSpec,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub summary: AggregateReport,
    pub fixtures: Vec<FixtureRecord>,
    pub gate: GateVerdict,
}

impl RunReport {
    pub fn new(
        corpus: CorpusSpec,
        started_at: DateTime<Utc>,
        outcome: RunOutcome,
        gate: GateVerdict,
    ) -> Self {
        Self {
            corpus,
            started_at,
            finished_at: Utc::now(),
            duration_ms: outcome.duration_ms,
            summary: outcome.aggregate,
            fixtures: outcome.records,
            gate,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))
    }
}
