//! Structural analysis of source units

pub mod python;

pub use python::PythonAnalyzer;

use crate::error::ParseError;
use crate::model::{AnalysisResult, SourceUnit};
use async_trait::async_trait;

/// Prefix of the summary recorded when narrative summarization fails
pub const SUMMARY_FAILURE_PREFIX: &str = "Summary generation failed";

/// Extracts functions, classes and a description from source text
///
/// Only a source with no recoverable structure is an error. A failing
/// narrative summary degrades to a placeholder string instead.
#[async_trait]
pub trait StructuralAnalyzer: Send + Sync {
    async fn analyze(&self, source: &SourceUnit) -> Result<AnalysisResult, ParseError>;
}
