//! Gate evaluation for pass/fail criteria.

use roundtrip_core::AggregateReport;
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// Process exit code for the harness.
    pub exit_code: u8,

    /// Violations that caused failure, one per failed fixture.
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Round-trip gate rules.
pub struct Gate;

impl Gate {
    /// The gate passes iff no fixture failed.
    ///
    /// Skips are environment or fixture problems, not decompiler defects, so
    /// an all-skipped run still passes.
    pub fn evaluate(report: &AggregateReport) -> GateVerdict {
        let violations: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.fixture_id, f.diagnostic))
            .collect();

        if violations.is_empty() {
            GateVerdict {
                passed: true,
                exit_code: 0,
                violations,
                message: format!(
                    "{} passed, {} skipped of {} fixtures",
                    report.passed, report.skipped, report.total
                ),
            }
        } else {
            GateVerdict {
                passed: false,
                exit_code: 1,
                message: format!(
                    "{} of {} fixtures failed to decompile",
                    report.failed, report.total
                ),
                violations,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtrip_core::Verdict;

    fn report(verdicts: &[(&str, Verdict)]) -> AggregateReport {
        AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)))
    }

    #[test]
    fn test_gate_passes_when_all_passed() {
        let verdict = Gate::evaluate(&report(&[("a", Verdict::Passed), ("b", Verdict::Passed)]));
        assert!(verdict.passed);
        assert_eq!(verdict.exit_code, 0);
        assert!(verdict.violations.is_empty());
    }

    #[test]
    fn test_gate_passes_when_all_skipped() {
        let verdict = Gate::evaluate(&report(&[
            ("a", Verdict::Skipped("compile timeout".to_string())),
            ("b", Verdict::Skipped("compile failed: x".to_string())),
        ]));
        assert!(verdict.passed);
        assert_eq!(verdict.exit_code, 0);
        assert!(verdict.message.contains("2 skipped"));
    }

    #[test]
    fn test_gate_fails_on_any_failure() {
        let verdict = Gate::evaluate(&report(&[
            ("a", Verdict::Passed),
            ("b", Verdict::Skipped("compile timeout".to_string())),
            ("c", Verdict::Failed("given: 1".to_string())),
        ]));
        assert!(!verdict.passed);
        assert_eq!(verdict.exit_code, 1);
        assert_eq!(verdict.violations, vec!["c: given: 1".to_string()]);
        assert!(verdict.message.contains("1 of 3"));
    }
}
