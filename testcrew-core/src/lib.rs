//! Core functionality for testcrew
//!
//! This crate contains the test-generation pipeline: the stage controller
//! with its bounded generate/validate feedback loop and execution retry
//! policy, the collaborator traits it drives (analyzer, generator,
//! validator, runner), and default implementations of those collaborators.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod output;
pub mod pipeline;
mod python;
pub mod runner;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{PipelineConfig, ReviewPolicy};
pub use error::{GenerationError, ParseError, PipelineError, Result, RunnerError};
pub use model::{
    AnalysisResult, CandidateTest, ClassInfo, Excerpts, ExecutionOutcome, FunctionInfo,
    ReviewRecord, SourceUnit, ValidationVerdict,
};
pub use output::{OutputLayout, PersistedPaths};
pub use pipeline::{AttemptBudget, Determination, PipelineController, PipelineReport, Stage};
