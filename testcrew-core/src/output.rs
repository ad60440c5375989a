//! Writing run results to disk
//!
//! Each run gets its own pair of files named after its run id, so
//! concurrent runs sharing a prefix never overwrite each other.

use crate::pipeline::PipelineReport;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_TEST_FILE_PREFIX: &str = "generated_tests/unit_test";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    /// Path prefix of written files; the run id and extension are appended
    pub test_file_prefix: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self { test_file_prefix: DEFAULT_TEST_FILE_PREFIX.to_string() }
    }
}

/// Files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaths {
    /// Absent when no candidate was accepted
    pub test_file: Option<PathBuf>,
    pub review_file: PathBuf,
}

impl OutputLayout {
    pub fn new(test_file_prefix: impl Into<String>) -> Self {
        Self { test_file_prefix: test_file_prefix.into() }
    }

    pub fn test_file_path(&self, run_id: Uuid) -> PathBuf {
        PathBuf::from(format!("{}_{}.py", self.test_file_prefix, run_id.simple()))
    }

    pub fn review_file_path(&self, run_id: Uuid) -> PathBuf {
        PathBuf::from(format!("{}_{}.review.json", self.test_file_prefix, run_id.simple()))
    }

    /// Write the accepted test code and the review record
    pub async fn persist(&self, report: &PipelineReport) -> Result<PersistedPaths> {
        let test_file = match report.accepted_code() {
            Some(code) => {
                let path = self.test_file_path(report.run_id);
                write(&path, code).await?;
                info!("Generated tests saved to: {}", path.display());
                Some(path)
            }
            None => None,
        };

        let review_file = self.review_file_path(report.run_id);
        let json =
            serde_json::to_string_pretty(&report.review).context("Failed to serialize review")?;
        write(&review_file, &json).await?;
        info!("Review saved to: {}", review_file.display());

        Ok(PersistedPaths { test_file, review_file })
    }
}

async fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, content).await.with_context(|| format!("Failed to write {}", path.display()))
}
