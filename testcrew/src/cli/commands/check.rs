//! Check command - lint a test file

use crate::cli::app::CheckArgs;
use anyhow::{Context, Result, bail};
use testcrew_core::validator::{LintValidator, PythonSyntaxValidator};

pub async fn execute(args: CheckArgs) -> Result<()> {
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let verdict = PythonSyntaxValidator::new().validate(&code);
    if verdict.valid {
        println!("{}: ok", args.file.display());
        return Ok(());
    }

    println!("{}:", args.file.display());
    for issue in &verdict.issues {
        println!("  {issue}");
    }
    bail!("{} issue(s) found", verdict.issues.len())
}
