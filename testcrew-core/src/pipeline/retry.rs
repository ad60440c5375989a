//! Attempt budgets and the execution retry loop

use crate::error::RunnerError;
use crate::model::ExecutionOutcome;
use crate::runner::{RunReport, TestArtifact, TestRunner};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hard upper bound on attempts of one kind
///
/// Attempt numbers start at 1 and only ever increase, so a loop driven by
/// [`AttemptBudget::try_begin`] always terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    max: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { max, used: 0 }
    }

    /// Claim the next attempt, returning its 1-based number
    pub fn try_begin(&mut self) -> Option<u32> {
        if self.used < self.max {
            self.used += 1;
            Some(self.used)
        } else {
            None
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.used
    }
}

/// Run the same artifact until it passes or the budget is spent
///
/// Every attempt is bounded by `timeout` here as well as inside the runner.
/// Runner errors and timeouts count as failed attempts.
pub(crate) async fn execute_with_retries(
    runner: &dyn TestRunner,
    artifact: &TestArtifact,
    max_attempts: u32,
    timeout: Duration,
) -> ExecutionOutcome {
    let mut budget = AttemptBudget::new(max_attempts);
    let mut last = RunReport::default();

    while let Some(attempt) = budget.try_begin() {
        let report = match tokio::time::timeout(timeout, runner.run(artifact, timeout)).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => failed_attempt(attempt, e),
            Err(_) => failed_attempt(attempt, RunnerError::timeout(timeout)),
        };

        if report.passed {
            info!(attempt, runner = runner.name(), "Tests passed");
            return ExecutionOutcome {
                passed: true,
                stdout: report.stdout,
                stderr: report.stderr,
                attempts_used: attempt,
            };
        }

        debug!(attempt, remaining = budget.remaining(), "Test run did not pass");
        last = report;
    }

    ExecutionOutcome {
        passed: false,
        stdout: last.stdout,
        stderr: last.stderr,
        attempts_used: budget.used(),
    }
}

/// Outcome for a run whose artifact could not be prepared
pub(crate) fn unstarted(err: RunnerError) -> ExecutionOutcome {
    warn!(error = %err, "Execution could not start");
    ExecutionOutcome {
        passed: false,
        stdout: String::new(),
        stderr: err.to_string(),
        attempts_used: 0,
    }
}

fn failed_attempt(attempt: u32, err: RunnerError) -> RunReport {
    warn!(attempt, error = %err, "Test run failed");
    RunReport { passed: false, stdout: String::new(), stderr: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_counts_up_to_max() {
        let mut budget = AttemptBudget::new(2);
        assert_eq!(budget.remaining(), 2);
        assert_eq!(budget.try_begin(), Some(1));
        assert_eq!(budget.remaining(), 1);
        assert_eq!(budget.try_begin(), Some(2));
        assert_eq!(budget.try_begin(), None);
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_zero_budget_never_begins() {
        let mut budget = AttemptBudget::new(0);
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.try_begin(), None);
    }

    #[test]
    fn test_unstarted_outcome() {
        let outcome = unstarted(RunnerError::artifact("disk full"));
        assert!(!outcome.passed);
        assert_eq!(outcome.attempts_used, 0);
        assert!(outcome.stderr.contains("disk full"));
    }
}
