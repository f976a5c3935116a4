//! Aggregation of per-fixture verdicts.

use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// One failed fixture and its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub fixture_id: String,
    pub diagnostic: String,
}

/// Summary counts plus the failures in encounter order.
///
/// `passed + failed + skipped == total` holds after every fold step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
    pub failures: Vec<FailureEntry>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one verdict into the report.
    pub fn record(mut self, fixture_id: &str, verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Skipped(_) => self.skipped += 1,
            Verdict::Passed => self.passed += 1,
            Verdict::Failed(diagnostic) => {
                self.failed += 1;
                self.failures.push(FailureEntry {
                    fixture_id: fixture_id.to_string(),
                    diagnostic: diagnostic.clone(),
                });
            }
        }
        self.total += 1;
        self
    }

    /// Fold a whole sequence of verdicts, in order.
    pub fn from_verdicts<'a, I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Verdict)>,
    {
        verdicts
            .into_iter()
            .fold(Self::new(), |report, (id, verdict)| report.record(id, verdict))
    }

    /// Whether the run should gate green: skips never count against it.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_holds(report: &AggregateReport) -> bool {
        report.passed + report.failed + report.skipped == report.total
    }

    #[test]
    fn test_counts_each_verdict_kind() {
        let verdicts = [
            ("a", Verdict::Passed),
            ("b", Verdict::Skipped("compile timeout".to_string())),
            ("c", Verdict::Failed("given: 1".to_string())),
            ("d", Verdict::Passed),
        ];
        let report =
            AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)));

        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total, 4);
        assert!(sum_holds(&report));
        assert!(!report.is_success());
    }

    #[test]
    fn test_invariant_holds_at_every_step() {
        let verdicts = [
            Verdict::Failed("x".to_string()),
            Verdict::Skipped("y".to_string()),
            Verdict::Passed,
        ];
        let mut report = AggregateReport::new();
        assert!(sum_holds(&report));
        for (i, verdict) in verdicts.iter().enumerate() {
            report = report.record(&format!("f{i}"), verdict);
            assert!(sum_holds(&report));
            assert_eq!(report.total, i + 1);
        }
    }

    #[test]
    fn test_failures_keep_encounter_order() {
        let verdicts = [
            ("zeta", Verdict::Failed("z".to_string())),
            ("alpha", Verdict::Failed("a".to_string())),
            ("mid", Verdict::Passed),
            ("beta", Verdict::Failed("b".to_string())),
        ];
        let report =
            AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)));
        let ids: Vec<&str> = report
            .failures
            .iter()
            .map(|f| f.fixture_id.as_str())
            .collect();
        assert_eq!(ids, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_all_skipped_is_success() {
        let verdicts = [
            ("a", Verdict::Skipped("compile timeout".to_string())),
            ("b", Verdict::Skipped("compile failed".to_string())),
        ];
        let report =
            AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)));
        assert_eq!(report.skipped, 2);
        assert!(report.is_success());
    }

    #[test]
    fn test_fold_is_deterministic() {
        let verdicts = [
            ("a", Verdict::Passed),
            ("b", Verdict::Failed("given: 2".to_string())),
        ];
        let first = AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)));
        let second = AggregateReport::from_verdicts(verdicts.iter().map(|(id, v)| (*id, v)));
        assert_eq!(first, second);
    }
}
