//! File configuration for the command line tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use testcrew_core::generator::OpenAICompatConfig;
use testcrew_core::{OutputLayout, PipelineConfig, ReviewPolicy};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "testcrew.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewConfig {
    pub pipeline: PipelineConfig,
    pub model: OpenAICompatConfig,
    pub runner: RunnerSettings,
    pub review: ReviewPolicy,
    pub output: OutputLayout,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            model: OpenAICompatConfig::default(),
            runner: RunnerSettings::default(),
            review: ReviewPolicy::default().with_narrative(true),
            output: OutputLayout::default(),
        }
    }
}

/// Interpreter command used to run generated tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: ["-m", "pytest", "-q", "--disable-warnings"].map(String::from).to_vec(),
        }
    }
}

impl CrewConfig {
    /// Load from `path`, or from `testcrew.toml` if it exists, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.pipeline.validate()?;
        config.review.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(CrewConfig::parse("").unwrap(), CrewConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = CrewConfig::parse(
            r#"
            [pipeline]
            max_execution_attempts = 2
            execution_timeout_seconds = 5.5

            [model]
            model = "llama-3.1-8b-instant"
            base_url = "https://api.groq.com/openai/v1"
            api_key_env = "GROQ_API_KEY"

            [runner]
            program = "python3"

            [output]
            test_file_prefix = "out/tests"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.max_execution_attempts, 2);
        assert_eq!(config.pipeline.max_generation_attempts, 3);
        assert_eq!(config.model.api_key_env, "GROQ_API_KEY");
        assert!((config.model.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.runner.program, "python3");
        assert_eq!(config.runner.args, RunnerSettings::default().args);
        assert_eq!(config.output.test_file_prefix, "out/tests");
    }

    #[test]
    fn test_written_review_on_unless_disabled() {
        assert!(CrewConfig::default().review.narrative);
        assert!(CrewConfig::parse("[review]\npassed_score = 0.8\n").unwrap().review.narrative);
        assert!(!CrewConfig::parse("[review]\nnarrative = false\n").unwrap().review.narrative);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CrewConfig::parse("[pipeline]\nmax_generation_attempts = 0\n").is_err());
        assert!(CrewConfig::parse("[review]\npassed_score = 2.0\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nprompt_char_budget = 500").unwrap();

        let config = CrewConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.pipeline.prompt_char_budget, 500);

        assert!(CrewConfig::load(Some(Path::new("/no/such/testcrew.toml"))).is_err());
    }
}
