//! Run configuration
//!
//! [`PipelineConfig`] is the only configuration the controller consumes per
//! run. [`ReviewPolicy`] tunes how the final review is assembled and is set
//! once on the controller.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_EXECUTION_ATTEMPTS: u32 = 3;
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 2000;
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: f64 = 20.0;

/// Per-run budgets and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Generation attempts before the run is declared failed
    pub max_generation_attempts: u32,

    /// Runner invocations before execution is declared failed
    pub max_execution_attempts: u32,

    /// Characters of source included in the generation prompt
    pub prompt_char_budget: usize,

    /// Wall-clock limit for a single runner invocation
    pub execution_timeout_seconds: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            max_execution_attempts: DEFAULT_MAX_EXECUTION_ATTEMPTS,
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            execution_timeout_seconds: DEFAULT_EXECUTION_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn with_generation_attempts(mut self, attempts: u32) -> Self {
        self.max_generation_attempts = attempts;
        self
    }

    pub fn with_execution_attempts(mut self, attempts: u32) -> Self {
        self.max_execution_attempts = attempts;
        self
    }

    pub fn with_execution_timeout(mut self, seconds: f64) -> Self {
        self.execution_timeout_seconds = seconds;
        self
    }

    pub fn with_prompt_char_budget(mut self, chars: usize) -> Self {
        self.prompt_char_budget = chars;
        self
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.execution_timeout_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_generation_attempts < 1 {
            return Err(PipelineError::config("max_generation_attempts must be at least 1"));
        }
        if self.max_execution_attempts < 1 {
            return Err(PipelineError::config("max_execution_attempts must be at least 1"));
        }
        if self.prompt_char_budget == 0 {
            return Err(PipelineError::config("prompt_char_budget must be positive"));
        }
        // Also rejects NaN and values Duration cannot represent
        if !(self.execution_timeout_seconds > 0.0)
            || Duration::try_from_secs_f64(self.execution_timeout_seconds).is_err()
        {
            return Err(PipelineError::config(format!(
                "execution_timeout_seconds must be a positive number, got {}",
                self.execution_timeout_seconds
            )));
        }
        Ok(())
    }
}

/// Scoring and excerpt policy for the review stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPolicy {
    /// Score when execution passed
    pub passed_score: f64,

    /// Score when execution ran but never passed
    pub failed_score: f64,

    /// Score when validation exhausted the generation budget
    pub exhausted_score: f64,

    pub stdout_excerpt_chars: usize,
    pub stderr_excerpt_chars: usize,

    /// Ask the generator for a written review of executed tests
    ///
    /// Off in [`ReviewPolicy::default`]; a deserialized policy that leaves
    /// it unset turns it on.
    #[serde(default = "narrative_when_configured")]
    pub narrative: bool,
}

fn narrative_when_configured() -> bool {
    true
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            passed_score: 0.9,
            failed_score: 0.6,
            exhausted_score: 0.0,
            stdout_excerpt_chars: 500,
            stderr_excerpt_chars: 300,
            narrative: false,
        }
    }
}

impl ReviewPolicy {
    pub fn with_narrative(mut self, narrative: bool) -> Self {
        self.narrative = narrative;
        self
    }

    /// Scores must lie in [0, 1] and never rank a failure above a pass
    pub fn validate(&self) -> Result<()> {
        let in_range = |s: f64| (0.0..=1.0).contains(&s);
        if !(in_range(self.passed_score)
            && in_range(self.failed_score)
            && in_range(self.exhausted_score))
        {
            return Err(PipelineError::config("review scores must lie in [0, 1]"));
        }
        if self.passed_score < self.failed_score || self.failed_score < self.exhausted_score {
            return Err(PipelineError::config(
                "review scores must satisfy passed >= failed >= exhausted",
            ));
        }
        Ok(())
    }
}
