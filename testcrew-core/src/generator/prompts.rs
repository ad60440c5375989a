//! Prompt templates for generation, summarization and review

use crate::error::GenerationError;
use crate::model::{AnalysisResult, SourceUnit, char_prefix};
use crate::runner::SOURCE_MODULE;

/// Characters of source sent when asking for a narrative summary
pub const SUMMARY_SOURCE_CHARS: usize = 1500;

const REVIEW_TEST_CODE_CHARS: usize = 1200;
const REVIEW_STDOUT_CHARS: usize = 1000;
const REVIEW_STDERR_CHARS: usize = 500;

/// Prompt asking for pytest tests of `source`
///
/// `issues` carries the validator diagnostics of the previous attempt, if
/// any, so the model can correct them.
pub fn generation_prompt(
    analysis: &AnalysisResult,
    source: &SourceUnit,
    char_budget: usize,
    issues: &[String],
) -> String {
    let mut prompt = format!(
        "You are a Python testing assistant.
Generate clean, minimal pytest tests for the following code.
Use only pytest (no unittest), and focus on key behaviors.
The code under test is importable with `from {SOURCE_MODULE} import *`.

=== SOURCE ANALYSIS ===
{summary}

=== SOURCE CODE ===
{code}
",
        summary = analysis.summary,
        code = source.prefix(char_budget),
    );

    if !issues.is_empty() {
        prompt.push_str("\n=== PREVIOUS ATTEMPT WAS REJECTED ===\n");
        for issue in issues {
            prompt.push_str("- ");
            prompt.push_str(issue);
            prompt.push('\n');
        }
    }

    prompt.push_str("\n=== OUTPUT FORMAT ===\nOnly provide valid Python test code using pytest.\n");
    prompt
}

/// Prompt asking for a short description of what the source does
pub fn summary_prompt(source: &SourceUnit) -> String {
    format!(
        "You are a code summarizer.
Provide a concise description of what this code does,
focusing on the purpose of each function and class.

=== SOURCE CODE ===
{}
",
        source.prefix(SUMMARY_SOURCE_CHARS)
    )
}

/// Prompt asking for a QA review of an executed test file
pub fn review_prompt(
    function_names: &[&str],
    test_code: &str,
    stdout: &str,
    stderr: &str,
) -> String {
    let functions = if function_names.is_empty() {
        "unknown functions".to_string()
    } else {
        function_names.join(", ")
    };

    format!(
        "You are a senior QA engineer reviewing automated test generation.
Analyze the following pytest output and generated test code.

=== FUNCTIONS UNDER TEST ===
{functions}

=== GENERATED TEST CODE ===
{test_code}

=== PYTEST OUTPUT ===
STDOUT:
{stdout}
STDERR:
{stderr}

Provide a short summary of test performance and clear, actionable
recommendations for improvement.
",
        test_code = char_prefix(test_code, REVIEW_TEST_CODE_CHARS),
        stdout = char_prefix(stdout, REVIEW_STDOUT_CHARS),
        stderr = char_prefix(stderr, REVIEW_STDERR_CHARS),
    )
}

/// Stand-in test code recorded when generation itself failed
pub fn placeholder_code(err: &GenerationError) -> String {
    let reason = err.to_string().replace('\n', " ");
    format!("# Error generating tests: {reason}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            functions: Vec::new(),
            classes: Vec::new(),
            summary: "Divides two numbers.".into(),
        }
    }

    #[test]
    fn test_generation_prompt_caps_source() {
        let source = SourceUnit::new("x".repeat(5000));
        let prompt = generation_prompt(&analysis(), &source, 100, &[]);
        assert!(prompt.contains(&"x".repeat(100)));
        assert!(!prompt.contains(&"x".repeat(101)));
        assert!(prompt.contains("Divides two numbers."));
        assert!(!prompt.contains("REJECTED"));
    }

    #[test]
    fn test_generation_prompt_carries_feedback() {
        let source = SourceUnit::new("def f(): pass");
        let issues = vec!["SyntaxError: line 2, column 1: unexpected `)`".to_string()];
        let prompt = generation_prompt(&analysis(), &source, 2000, &issues);
        assert!(prompt.contains("PREVIOUS ATTEMPT WAS REJECTED"));
        assert!(prompt.contains("unexpected `)`"));
    }

    #[test]
    fn test_placeholder_is_single_comment_line() {
        let code = placeholder_code(&GenerationError::network("connection\nreset"));
        assert_eq!(code.lines().count(), 1);
        assert!(code.starts_with("# Error generating tests: Network error"));
    }

    #[test]
    fn test_review_prompt_defaults() {
        let prompt = review_prompt(&[], "def test_x(): pass", "", "");
        assert!(prompt.contains("unknown functions"));
    }
}
