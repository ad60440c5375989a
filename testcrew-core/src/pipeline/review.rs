//! Review assembly

use super::Stage;
use crate::config::ReviewPolicy;
use crate::model::{AnalysisResult, Excerpts, ExecutionOutcome, ReviewRecord, char_prefix};

/// Prefix of the narrative recorded when the written review fails
pub const REVIEW_FAILURE_PREFIX: &str = "Review generation failed";

/// Which stage decided the outcome of a run, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Determination {
    Passed { attempt: u32, max_attempts: u32 },
    ExecutionFailed { attempts: u32 },
    ValidationExhausted { attempts: u32, issues: Vec<String> },
}

impl Determination {
    pub fn from_execution(outcome: &ExecutionOutcome, max_attempts: u32) -> Self {
        if outcome.passed {
            Self::Passed { attempt: outcome.attempts_used, max_attempts }
        } else {
            Self::ExecutionFailed { attempts: outcome.attempts_used }
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Terminal stage of a run ending with this determination
    pub fn final_stage(&self) -> Stage {
        match self {
            Self::ValidationExhausted { .. } => Stage::Failed,
            _ => Stage::Done,
        }
    }

    /// One-line verdict naming the deciding stage
    pub fn verdict(&self) -> String {
        match self {
            Self::Passed { attempt, max_attempts } => {
                format!("execution passed on attempt {attempt} of {max_attempts}")
            }
            Self::ExecutionFailed { attempts: 0 } => {
                "execution failed before any attempt: test artifact could not be prepared"
                    .to_string()
            }
            Self::ExecutionFailed { attempts } => {
                format!("execution failed after {attempts} {}", plural(*attempts, "attempt"))
            }
            Self::ValidationExhausted { attempts, issues } => {
                let issues =
                    if issues.is_empty() { "none reported".to_string() } else { issues.join("; ") };
                format!(
                    "validation budget exhausted after {attempts} {}; unresolved issues: {issues}",
                    plural(*attempts, "attempt")
                )
            }
        }
    }

    fn score(&self, policy: &ReviewPolicy) -> f64 {
        match self {
            Self::Passed { .. } => policy.passed_score,
            Self::ExecutionFailed { .. } => policy.failed_score,
            Self::ValidationExhausted { .. } => policy.exhausted_score,
        }
    }
}

/// Combine the run's results into its terminal record
pub(crate) fn assemble(
    policy: &ReviewPolicy,
    analysis: &AnalysisResult,
    determination: &Determination,
    execution: Option<&ExecutionOutcome>,
    narrative: Option<String>,
) -> ReviewRecord {
    let mut summary = determination.verdict();

    let functions = analysis.function_names();
    if !functions.is_empty() {
        summary.push_str("\nfunctions under test: ");
        summary.push_str(&functions.join(", "));
    }

    if let Some(narrative) = narrative {
        summary.push_str("\n\n");
        summary.push_str(narrative.trim());
    }

    let excerpts = execution
        .map(|outcome| Excerpts {
            stdout: char_prefix(&outcome.stdout, policy.stdout_excerpt_chars).to_string(),
            stderr: char_prefix(&outcome.stderr, policy.stderr_excerpt_chars).to_string(),
        })
        .unwrap_or_default();

    ReviewRecord {
        summary,
        score: determination.score(policy),
        passed: determination.passed(),
        excerpts,
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 { noun.to_string() } else { format!("{noun}s") }
}
