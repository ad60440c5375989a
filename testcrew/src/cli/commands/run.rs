//! Run command - full pipeline over one or more source files

use super::read_source;
use crate::cli::app::RunArgs;
use crate::cli::config::CrewConfig;
use anyhow::{Result, bail};
use std::sync::Arc;
use std::time::Duration;
use testcrew_core::analyzer::PythonAnalyzer;
use testcrew_core::generator::{Generator, OpenAICompatGenerator};
use testcrew_core::runner::PytestRunner;
use testcrew_core::validator::PythonSyntaxValidator;
use testcrew_core::{OutputLayout, PipelineController, PipelineReport};
use tracing::{error, warn};

pub async fn execute(args: RunArgs, mut config: CrewConfig) -> Result<()> {
    apply_overrides(&args, &mut config);
    config.pipeline.validate()?;

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        sources.push(read_source(path).await?);
    }

    let generation_timeout = Duration::from_secs(config.model.timeout_secs);
    let generator: Arc<dyn Generator> = Arc::new(OpenAICompatGenerator::new(config.model.clone())?);
    let analyzer = PythonAnalyzer::new()
        .with_summarizer(generator.clone())
        .with_summary_timeout(generation_timeout);
    let runner =
        PytestRunner::new().with_command(&config.runner.program, config.runner.args.clone());

    let controller = PipelineController::new(
        Arc::new(analyzer),
        generator,
        Arc::new(PythonSyntaxValidator::new()),
        Arc::new(runner),
    )
    .with_review_policy(config.review.clone())
    .with_generation_timeout(generation_timeout);

    // Dropping the batch on Ctrl-C cancels every run and removes its workspace
    let results = tokio::select! {
        results = controller.run_batch(sources, &config.pipeline, args.jobs) => results,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling in-flight runs");
            bail!("interrupted");
        }
    };

    let mut errors = 0;
    for (path, result) in args.files.iter().zip(results) {
        println!("\n=== {} ===", path.display());
        match result {
            Ok(report) => {
                print_report(&report);
                if let Err(e) = save(&config.output, &report).await {
                    error!("Failed to save results for {}: {e:#}", path.display());
                    errors += 1;
                }
            }
            Err(e) => {
                println!("  Error: {e}");
                errors += 1;
            }
        }
    }

    if errors > 0 {
        bail!("{errors} of {} files could not be processed", args.files.len());
    }
    Ok(())
}

fn apply_overrides(args: &RunArgs, config: &mut CrewConfig) {
    if let Some(attempts) = args.generation_attempts {
        config.pipeline.max_generation_attempts = attempts;
    }
    if let Some(attempts) = args.execution_attempts {
        config.pipeline.max_execution_attempts = attempts;
    }
    if let Some(timeout) = args.timeout {
        config.pipeline.execution_timeout_seconds = timeout;
    }
    if let Some(prefix) = &args.out {
        config.output.test_file_prefix = prefix.clone();
    }
    if let Some(model) = &args.model {
        config.model.model = model.clone();
    }
    if args.no_narrative {
        config.review.narrative = false;
    }
}

fn print_report(report: &PipelineReport) {
    let review = &report.review;
    println!("  Stage: {}", report.final_stage);
    println!("  Passed: {}", review.passed);
    println!("  Score: {:.2}", review.score);
    println!("  Generation attempts: {}", report.generation_attempts);
    println!("\n  Review:");
    for line in review.summary.lines() {
        println!("    {line}");
    }
}

async fn save(layout: &OutputLayout, report: &PipelineReport) -> Result<()> {
    let paths = layout.persist(report).await?;
    if let Some(test_file) = &paths.test_file {
        println!("\n  Tests saved to: {}", test_file.display());
    }
    println!("  Review saved to: {}", paths.review_file.display());
    Ok(())
}
