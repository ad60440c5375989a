//! Generative model collaborator
//!
//! The pipeline talks to a model through the [`Generator`] trait: a prompt
//! goes in, text comes out. Implementations map every transport failure
//! into a [`GenerationError`]; the controller decides what to retry.

pub mod openai_compat;
pub mod prompts;

pub use openai_compat::{OpenAICompatConfig, OpenAICompatGenerator};

use crate::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// Default upper bound on a single generation call made by the pipeline
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

#[async_trait]
pub trait Generator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Produce text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Run a generation call with a hard deadline
pub async fn generate_with_timeout(
    generator: &dyn Generator,
    prompt: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Generator for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".into())
        }
    }

    #[tokio::test]
    async fn test_generation_deadline() {
        let result = generate_with_timeout(&Stalled, "prompt", Duration::from_millis(20)).await;
        assert!(matches!(result, Err(GenerationError::Timeout { .. })));
    }
}
