//! Per-run scratch directory holding the code under test and its tests

use crate::error::RunnerError;
use crate::model::{CandidateTest, SourceUnit};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Module name the generated tests import the source from
pub const SOURCE_MODULE: &str = "source_under_test";

const TEST_FILE_NAME: &str = "test_generated.py";

/// Files a runner needs to execute one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestArtifact {
    pub test_file: PathBuf,
    pub working_dir: PathBuf,
}

/// Temporary directory owned by a single run
///
/// The directory is removed when the workspace is dropped, including when a
/// run is cancelled mid-flight.
pub struct ArtifactWorkspace {
    dir: TempDir,
}

impl ArtifactWorkspace {
    pub fn create(run_id: Uuid) -> Result<Self, RunnerError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("testcrew-{}-", run_id.simple()))
            .tempdir()
            .map_err(|e| RunnerError::artifact(format!("Failed to create workspace: {e}")))?;

        debug!("Created workspace at: {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the source module and the candidate's test file
    pub async fn materialize(
        &self,
        source: &SourceUnit,
        candidate: &CandidateTest,
    ) -> Result<TestArtifact, RunnerError> {
        let module = self.path().join(format!("{SOURCE_MODULE}.py"));
        write(&module, &source.dedented()).await?;

        let test_file = self.path().join(TEST_FILE_NAME);
        write(&test_file, &candidate.code).await?;

        Ok(TestArtifact { test_file, working_dir: self.path().to_path_buf() })
    }
}

async fn write(path: &Path, content: &str) -> Result<(), RunnerError> {
    fs::write(path, content)
        .await
        .map_err(|e| RunnerError::artifact(format!("Failed to write {}: {e}", path.display())))
}
