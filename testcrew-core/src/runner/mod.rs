//! Test execution collaborator
//!
//! A runner executes one materialized test artifact and reports whether it
//! passed. Every invocation is bounded by the timeout the caller passes;
//! retrying is the controller's job.

pub mod pytest;
pub mod workspace;

pub use pytest::PytestRunner;
pub use workspace::{ArtifactWorkspace, SOURCE_MODULE, TestArtifact};

use crate::error::RunnerError;
use async_trait::async_trait;
use std::time::Duration;

/// Output of a single runner invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Execute the artifact once, giving up after `timeout`
    async fn run(&self, artifact: &TestArtifact, timeout: Duration)
    -> Result<RunReport, RunnerError>;
}
