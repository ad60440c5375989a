//! Records flowing through a pipeline run

use serde::{Deserialize, Serialize};

/// Raw source text handed to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    text: String,
}

impl SourceUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when there is nothing but whitespace to analyze
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Source with common leading indentation removed
    pub fn dedented(&self) -> String {
        dedent(&self.text)
    }

    /// At most `budget` characters from the start of the source
    pub fn prefix(&self, budget: usize) -> &str {
        char_prefix(&self.text, budget)
    }
}

impl From<String> for SourceUnit {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SourceUnit {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A function or method found in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub parameters: Vec<String>,
    pub docstring: Option<String>,
}

/// A class found in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub docstring: Option<String>,
}

/// Structural facts about a source unit, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub summary: String,
}

impl AnalysisResult {
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }
}

/// Generated test code for one generation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTest {
    pub code: String,
    pub attempt_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub issues: Vec<String>,
}

impl ValidationVerdict {
    pub fn accepted() -> Self {
        Self { valid: true, issues: Vec::new() }
    }

    pub fn rejected(issues: Vec<String>) -> Self {
        Self { valid: false, issues }
    }
}

/// Result of the execution stage across all of its attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
    pub attempts_used: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpts {
    pub stdout: String,
    pub stderr: String,
}

/// Terminal artifact of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub summary: String,
    pub score: f64,
    pub passed: bool,
    pub excerpts: Excerpts,
}

/// Longest prefix of `text` holding at most `budget` characters
pub fn char_prefix(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Strip the indentation shared by every non-blank line
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(margin..).unwrap_or_else(|| l.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
