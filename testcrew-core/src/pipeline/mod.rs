//! The test-generation pipeline
//!
//! A run moves through `ANALYZE → GENERATE → VALIDATE → EXECUTE → REVIEW`.
//! Rejected candidates loop back from VALIDATE to GENERATE until the
//! generation budget runs out, which ends the run in `FAILED`. Execution
//! retries re-run the same artifact under a separate budget and never
//! trigger regeneration.

mod batch;
mod controller;
mod retry;
mod review;


pub use controller::PipelineController;
pub use retry::AttemptBudget;
pub use review::Determination;

use crate::model::{AnalysisResult, CandidateTest, ExecutionOutcome, ReviewRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stages of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Analyze,
    Generate,
    Validate,
    Execute,
    Review,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Analyze => "ANALYZE",
            Stage::Generate => "GENERATE",
            Stage::Validate => "VALIDATE",
            Stage::Execute => "EXECUTE",
            Stage::Review => "REVIEW",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Everything a finished run produced
///
/// `review` is the boundary record; the rest is kept for callers that
/// persist the accepted test or want to inspect how the run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub final_stage: Stage,
    pub analysis: AnalysisResult,
    /// Last candidate produced, accepted or not
    pub candidate: CandidateTest,
    /// Whether `candidate` passed validation
    pub accepted: bool,
    pub generation_attempts: u32,
    /// Absent when the run never reached EXECUTE
    pub execution: Option<ExecutionOutcome>,
    pub review: ReviewRecord,
}

impl PipelineReport {
    pub fn passed(&self) -> bool {
        self.review.passed
    }

    /// Test code worth keeping, if validation accepted it
    pub fn accepted_code(&self) -> Option<&str> {
        self.accepted.then_some(self.candidate.code.as_str())
    }
}
