use super::retry::{self, AttemptBudget};
use super::review::{self, Determination, REVIEW_FAILURE_PREFIX};
use super::{PipelineReport, Stage};
use crate::analyzer::StructuralAnalyzer;
use crate::config::{PipelineConfig, ReviewPolicy};
use crate::error::{PipelineError, Result};
use crate::generator::{DEFAULT_GENERATION_TIMEOUT, Generator, generate_with_timeout, prompts};
use crate::model::{AnalysisResult, CandidateTest, ExecutionOutcome, ReviewRecord, SourceUnit};
use crate::runner::{ArtifactWorkspace, TestRunner};
use crate::validator::LintValidator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Where a run goes next; each variant carries the data the stage consumes
enum Step {
    Generate { attempt: u32, feedback: Vec<String> },
    Validate(CandidateTest),
    Execute(CandidateTest),
    Review {
        candidate: CandidateTest,
        accepted: bool,
        determination: Determination,
        execution: Option<ExecutionOutcome>,
    },
}

impl Step {
    fn stage(&self) -> Stage {
        match self {
            Step::Generate { .. } => Stage::Generate,
            Step::Validate(_) => Stage::Validate,
            Step::Execute(_) => Stage::Execute,
            Step::Review { .. } => Stage::Review,
        }
    }
}

/// Drives source units through the pipeline stages
///
/// The controller holds no per-run state, so one instance can serve any
/// number of concurrent runs. Each run gets its own id and workspace.
pub struct PipelineController {
    analyzer: Arc<dyn StructuralAnalyzer>,
    generator: Arc<dyn Generator>,
    validator: Arc<dyn LintValidator>,
    runner: Arc<dyn TestRunner>,
    review_policy: ReviewPolicy,
    generation_timeout: Duration,
}

impl PipelineController {
    pub fn new(
        analyzer: Arc<dyn StructuralAnalyzer>,
        generator: Arc<dyn Generator>,
        validator: Arc<dyn LintValidator>,
        runner: Arc<dyn TestRunner>,
    ) -> Self {
        Self {
            analyzer,
            generator,
            validator,
            runner,
            review_policy: ReviewPolicy::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_review_policy(mut self, policy: ReviewPolicy) -> Self {
        self.review_policy = policy;
        self
    }

    /// Upper bound on each generator call made by the controller
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Run the pipeline and return only the review record
    pub async fn run_pipeline(
        &self,
        source: &SourceUnit,
        config: &PipelineConfig,
    ) -> Result<ReviewRecord> {
        Ok(self.run(source, config).await?.review)
    }

    /// Run the pipeline on one source unit
    ///
    /// Fails only on invalid configuration, blank input, or source the
    /// analyzer cannot parse. Every later failure ends up in the report.
    pub async fn run(
        &self,
        source: &SourceUnit,
        config: &PipelineConfig,
    ) -> Result<PipelineReport> {
        config.validate()?;
        self.review_policy.validate()?;
        if source.is_blank() {
            return Err(PipelineError::input("source is empty"));
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);
        self.drive(run_id, source, config).instrument(span).await
    }

    async fn drive(
        &self,
        run_id: Uuid,
        source: &SourceUnit,
        config: &PipelineConfig,
    ) -> Result<PipelineReport> {
        info!(source_chars = source.text().chars().count(), "Pipeline run started");

        debug!(stage = %Stage::Analyze, "Entering stage");
        let analysis = self.analyzer.analyze(source).await?;

        let mut generation = AttemptBudget::new(config.max_generation_attempts);
        let first = generation
            .try_begin()
            .ok_or_else(|| PipelineError::config("max_generation_attempts must be at least 1"))?;
        let mut step = Step::Generate { attempt: first, feedback: Vec::new() };

        loop {
            debug!(stage = %step.stage(), "Entering stage");
            step = match step {
                Step::Generate { attempt, feedback } => {
                    let candidate =
                        self.generate(&analysis, source, config, attempt, &feedback).await;
                    Step::Validate(candidate)
                }
                Step::Validate(candidate) => {
                    let verdict = self.validator.validate(&candidate.code);
                    if verdict.valid {
                        Step::Execute(candidate)
                    } else {
                        warn!(
                            attempt = candidate.attempt_number,
                            issues = verdict.issues.len(),
                            "Candidate rejected"
                        );
                        match generation.try_begin() {
                            Some(attempt) => Step::Generate { attempt, feedback: verdict.issues },
                            None => Step::Review {
                                candidate,
                                accepted: false,
                                determination: Determination::ValidationExhausted {
                                    attempts: generation.used(),
                                    issues: verdict.issues,
                                },
                                execution: None,
                            },
                        }
                    }
                }
                Step::Execute(candidate) => {
                    let execution = self.execute(run_id, source, &candidate, config).await;
                    let determination =
                        Determination::from_execution(&execution, config.max_execution_attempts);
                    Step::Review {
                        candidate,
                        accepted: true,
                        determination,
                        execution: Some(execution),
                    }
                }
                Step::Review { candidate, accepted, determination, execution } => {
                    let narrative = self.narrate(&analysis, &candidate, execution.as_ref()).await;
                    let review = review::assemble(
                        &self.review_policy,
                        &analysis,
                        &determination,
                        execution.as_ref(),
                        narrative,
                    );
                    let final_stage = determination.final_stage();

                    info!(
                        stage = %final_stage,
                        passed = review.passed,
                        score = review.score,
                        generation_attempts = generation.used(),
                        "Pipeline run finished"
                    );

                    return Ok(PipelineReport {
                        run_id,
                        final_stage,
                        analysis,
                        candidate,
                        accepted,
                        generation_attempts: generation.used(),
                        execution,
                        review,
                    });
                }
            };
        }
    }

    /// One generation attempt; a failed call becomes a placeholder candidate
    async fn generate(
        &self,
        analysis: &AnalysisResult,
        source: &SourceUnit,
        config: &PipelineConfig,
        attempt: u32,
        feedback: &[String],
    ) -> CandidateTest {
        let prompt =
            prompts::generation_prompt(analysis, source, config.prompt_char_budget, feedback);

        let reply =
            generate_with_timeout(self.generator.as_ref(), &prompt, self.generation_timeout).await;
        let code = match reply {
            Ok(text) => regex_utils::code_fence::strip(&text),
            Err(e) => {
                warn!(attempt, generator = self.generator.name(), error = %e, "Generation failed");
                prompts::placeholder_code(&e)
            }
        };

        debug!(attempt, code_chars = code.len(), "Candidate generated");
        CandidateTest { code, attempt_number: attempt }
    }

    /// Materialize the candidate in a fresh workspace and run it
    ///
    /// The workspace lives until this returns or the run is dropped.
    async fn execute(
        &self,
        run_id: Uuid,
        source: &SourceUnit,
        candidate: &CandidateTest,
        config: &PipelineConfig,
    ) -> ExecutionOutcome {
        let workspace = match ArtifactWorkspace::create(run_id) {
            Ok(workspace) => workspace,
            Err(e) => return retry::unstarted(e),
        };
        let artifact = match workspace.materialize(source, candidate).await {
            Ok(artifact) => artifact,
            Err(e) => return retry::unstarted(e),
        };

        retry::execute_with_retries(
            self.runner.as_ref(),
            &artifact,
            config.max_execution_attempts,
            config.execution_timeout(),
        )
        .await
    }

    /// Written review of an executed candidate, when the policy asks for one
    async fn narrate(
        &self,
        analysis: &AnalysisResult,
        candidate: &CandidateTest,
        execution: Option<&ExecutionOutcome>,
    ) -> Option<String> {
        if !self.review_policy.narrative {
            return None;
        }
        let execution = execution?;

        let prompt = prompts::review_prompt(
            &analysis.function_names(),
            &candidate.code,
            &execution.stdout,
            &execution.stderr,
        );
        let reply =
            generate_with_timeout(self.generator.as_ref(), &prompt, self.generation_timeout).await;
        match reply {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Review generation failed");
                Some(format!("{REVIEW_FAILURE_PREFIX}: {e}"))
            }
        }
    }
}
