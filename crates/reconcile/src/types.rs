//! Core types for reconciliation results

use serde::Serialize;

/// What happened to a single specification during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Check reported the state already holds; apply was skipped
    Satisfied,
    /// Check reported a difference and apply converged it
    Applied,
}

/// Which half of the contract failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Check,
    Apply,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Check => write!(f, "check"),
            Phase::Apply => write!(f, "apply"),
        }
    }
}

/// Summary of a successful reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub satisfied: usize,
    pub applied: usize,
}

impl ReconcileSummary {
    /// Total number of specifications processed
    pub fn total(&self) -> usize {
        self.satisfied + self.applied
    }

    /// Check if the pass changed anything
    pub fn has_changes(&self) -> bool {
        self.applied > 0
    }

    /// Add an outcome to the summary
    pub fn add_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Satisfied => self.satisfied += 1,
            Outcome::Applied => self.applied += 1,
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ReconcileSummary) {
        self.satisfied += other.satisfied;
        self.applied += other.applied;
    }
}

/// A specification a check-only pass found unsatisfied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSpec {
    /// Position in the project's specification sequence
    pub index: usize,
    /// Concrete type of the specification
    pub spec_type: &'static str,
}

/// Result of a check-only pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub satisfied: usize,
    pub pending: Vec<PendingSpec>,
}

impl CheckReport {
    /// Whether every specification is already satisfied
    pub fn is_converged(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ReconcileSummary::default();
        summary.add_outcome(Outcome::Satisfied);
        summary.add_outcome(Outcome::Applied);
        summary.add_outcome(Outcome::Applied);

        assert_eq!(summary.total(), 3);
        assert!(summary.has_changes());

        let mut total = ReconcileSummary::default();
        total.merge(&summary);
        total.merge(&summary);
        assert_eq!(total.applied, 4);
        assert_eq!(total.satisfied, 2);
    }

    #[test]
    fn test_check_report_converged() {
        let mut report = CheckReport::default();
        assert!(report.is_converged());
        report.pending.push(PendingSpec {
            index: 0,
            spec_type: "x",
        });
        assert!(!report.is_converged());
    }
}
