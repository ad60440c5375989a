//! Error types for pipeline runs
//!
//! Only [`PipelineError`] ever leaves a run. Collaborator errors
//! ([`GenerationError`], [`RunnerError`]) are recoverable: the controller
//! retries them within budget and records the rest in the review.

use std::time::Duration;
use thiserror::Error;

/// Fatal errors surfaced to the caller of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source was empty or otherwise unusable before any stage ran
    #[error("Input rejected: {message}")]
    Input { message: String },

    /// The analyzer could not extract any structure from the source
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Pipeline configuration failed validation
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl PipelineError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

/// Raised by a structural analyzer when the source cannot be parsed at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse source: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Failures of the generative model client
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Generation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Quota exceeded: {message}")]
    Quota { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GenerationError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::Quota { message: message.into() }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api { status, message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

/// Failures while preparing or executing a test artifact
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    #[error("Test run timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Failed to start test process: {message}")]
    Spawn { message: String },

    #[error("Failed to prepare test artifact: {message}")]
    Artifact { message: String },
}

impl RunnerError {
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn { message: message.into() }
    }

    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
