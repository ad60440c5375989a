pub mod analyze;
pub mod check;
pub mod run;

use anyhow::{Context, Result};
use std::path::Path;
use testcrew_core::SourceUnit;

async fn read_source(path: &Path) -> Result<SourceUnit> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SourceUnit::new(text))
}
