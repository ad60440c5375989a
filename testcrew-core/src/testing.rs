//! Scripted collaborators for pipeline tests

use crate::analyzer::{PythonAnalyzer, StructuralAnalyzer};
use crate::error::{GenerationError, ParseError, RunnerError};
use crate::generator::Generator;
use crate::model::{AnalysisResult, SourceUnit, ValidationVerdict};
use crate::runner::{RunReport, TestArtifact, TestRunner};
use crate::validator::LintValidator;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replies from a queue, then repeats a fallback; records every prompt
pub(crate) struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(
        script: Vec<Result<String, GenerationError>>,
        fallback: Result<String, GenerationError>,
    ) -> Self {
        Self { script: Mutex::new(script.into()), fallback, prompts: Mutex::new(Vec::new()) }
    }

    pub(crate) fn always(text: &str) -> Self {
        Self::new(Vec::new(), Ok(text.to_string()))
    }

    pub(crate) fn failing(err: GenerationError) -> Self {
        Self::new(Vec::new(), Err(err))
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Returns queued verdicts, then a fallback
pub(crate) struct ScriptedValidator {
    script: Mutex<VecDeque<ValidationVerdict>>,
    fallback: ValidationVerdict,
    calls: AtomicUsize,
}

impl ScriptedValidator {
    pub(crate) fn new(script: Vec<ValidationVerdict>, fallback: ValidationVerdict) -> Self {
        Self { script: Mutex::new(script.into()), fallback, calls: AtomicUsize::new(0) }
    }

    pub(crate) fn accepting() -> Self {
        Self::new(Vec::new(), ValidationVerdict::accepted())
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LintValidator for ScriptedValidator {
    fn validate(&self, _code: &str) -> ValidationVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Pass,
    Fail,
    /// Runner reports its own timeout
    Timeout,
    /// Never returns; only the caller's deadline ends the attempt
    Hang,
}

/// Runner following a script of behaviors; records what it was handed
pub(crate) struct ScriptedRunner {
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    seen: Mutex<Vec<(TestArtifact, String)>>,
}

impl ScriptedRunner {
    pub(crate) fn new(script: Vec<Behavior>, fallback: Behavior) -> Self {
        Self { script: Mutex::new(script.into()), fallback, seen: Mutex::new(Vec::new()) }
    }

    pub(crate) fn always(behavior: Behavior) -> Self {
        Self::new(Vec::new(), behavior)
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Working directories of every invocation
    pub(crate) fn working_dirs(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().iter().map(|(a, _)| a.working_dir.clone()).collect()
    }

    /// Test file contents as they were on disk at each invocation
    pub(crate) fn test_files(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, code)| code.clone()).collect()
    }
}

#[async_trait]
impl TestRunner for ScriptedRunner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(
        &self,
        artifact: &TestArtifact,
        timeout: Duration,
    ) -> Result<RunReport, RunnerError> {
        let code = std::fs::read_to_string(&artifact.test_file).unwrap_or_default();
        self.seen.lock().unwrap().push((artifact.clone(), code));
        let behavior = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);

        match behavior {
            Behavior::Pass => Ok(RunReport {
                passed: true,
                stdout: "3 passed in 0.01s".into(),
                stderr: String::new(),
            }),
            Behavior::Fail => Ok(RunReport {
                passed: false,
                stdout: "1 failed, 2 passed in 0.02s".into(),
                stderr: "AssertionError".into(),
            }),
            Behavior::Timeout => Err(RunnerError::timeout(timeout)),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(RunReport::default())
            }
        }
    }
}

/// Real Python analyzer that counts invocations
pub(crate) struct CountingAnalyzer {
    inner: PythonAnalyzer,
    calls: AtomicUsize,
}

impl CountingAnalyzer {
    pub(crate) fn new() -> Self {
        Self { inner: PythonAnalyzer::new(), calls: AtomicUsize::new(0) }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuralAnalyzer for CountingAnalyzer {
    async fn analyze(&self, source: &SourceUnit) -> Result<AnalysisResult, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.analyze(source).await
    }
}
