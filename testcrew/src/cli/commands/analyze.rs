//! Analyze command - print the structure of a source file

use super::read_source;
use crate::cli::app::AnalyzeArgs;
use crate::cli::config::CrewConfig;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use testcrew_core::analyzer::{PythonAnalyzer, StructuralAnalyzer};
use testcrew_core::generator::OpenAICompatGenerator;

pub async fn execute(args: AnalyzeArgs, config: CrewConfig) -> Result<()> {
    let source = read_source(&args.file).await?;

    let mut analyzer = PythonAnalyzer::new();
    if args.summarize {
        let generator = OpenAICompatGenerator::new(config.model.clone())?;
        analyzer = analyzer
            .with_summarizer(Arc::new(generator))
            .with_summary_timeout(Duration::from_secs(config.model.timeout_secs));
    }

    let analysis = analyzer.analyze(&source).await?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
