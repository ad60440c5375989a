use super::{RunReport, TestArtifact, TestRunner};
use crate::error::RunnerError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Runs a test file through pytest in a child process
pub struct PytestRunner {
    program: String,
    args: Vec<String>,
}

impl Default for PytestRunner {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: ["-m", "pytest", "-q", "--disable-warnings"].map(String::from).to_vec(),
        }
    }
}

impl PytestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the interpreter and the arguments placed before the test file
    pub fn with_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }
}

#[async_trait]
impl TestRunner for PytestRunner {
    fn name(&self) -> &str {
        "pytest"
    }

    async fn run(
        &self,
        artifact: &TestArtifact,
        timeout: Duration,
    ) -> Result<RunReport, RunnerError> {
        let start = Instant::now();
        debug!("Running {} {:?} on {:?}", self.program, self.args, artifact.test_file);

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&artifact.test_file)
            .current_dir(&artifact.working_dir)
            .env("PYTHONPATH", &artifact.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::spawn(format!("{}: {e}", self.program)))?;

        // Dropping the wait future on timeout kills the child
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| RunnerError::spawn(e.to_string()))?,
            Err(_) => return Err(RunnerError::timeout(timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        match regex_utils::pytest::parse_summary(&stdout) {
            Some(summary) => debug!(
                passed = summary.passed,
                failed = summary.failed,
                errors = summary.errors,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "pytest finished"
            ),
            None => {
                debug!(exit_code = ?output.status.code(), "pytest finished without a summary line")
            }
        }

        Ok(RunReport { passed: output.status.success(), stdout, stderr })
    }
}
