use super::{PipelineController, PipelineReport};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::SourceUnit;
use futures::stream::{self, StreamExt};
use tracing::info;

impl PipelineController {
    /// Run several independent sources with at most `concurrency` in flight
    ///
    /// Results come back in input order. A failing source does not affect
    /// the others.
    pub async fn run_batch(
        &self,
        sources: Vec<SourceUnit>,
        config: &PipelineConfig,
        concurrency: usize,
    ) -> Vec<Result<PipelineReport>> {
        let concurrency = concurrency.max(1);
        info!(sources = sources.len(), concurrency, "Starting batch");

        stream::iter(sources)
            .map(|source| async move { self.run(&source, config).await })
            .buffered(concurrency)
            .collect()
            .await
    }
}
