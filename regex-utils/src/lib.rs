//! Regex utilities for testcrew
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown code fences in model output
pub mod code_fence {
    use super::*;

    pub static FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+\-]*[ \t]*\r?\n(.*?)```")
            .expect("Invalid regex pattern")
    });

    /// Extract the body of the first fenced block, if any
    pub fn extract(text: &str) -> Option<String> {
        FENCE_PATTERN
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end().to_string())
    }

    /// Return the first fenced block, or the trimmed text when unfenced
    pub fn strip(text: &str) -> String {
        extract(text).unwrap_or_else(|| text.trim().to_string())
    }
}

/// Pytest terminal summary parsing
pub mod pytest {
    use super::*;

    pub static COUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(\d+) (passed|failed|errors?|skipped|xfailed|xpassed|deselected|warnings?)")
            .expect("Invalid regex pattern")
    });

    pub static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r" in ([0-9]+(?:\.[0-9]+)?)s").expect("Invalid regex pattern")
    });

    /// Counts reported on pytest's final summary line
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct PytestSummary {
        pub passed: usize,
        pub failed: usize,
        pub errors: usize,
        pub skipped: usize,
        pub duration_secs: Option<f64>,
    }

    impl PytestSummary {
        pub fn total(&self) -> usize {
            self.passed + self.failed + self.errors + self.skipped
        }
    }

    /// Parse the last summary line (`2 passed, 1 failed in 0.12s`) of pytest output
    pub fn parse_summary(output: &str) -> Option<PytestSummary> {
        let line = output
            .lines()
            .rev()
            .find(|l| DURATION_PATTERN.is_match(l) && COUNT_PATTERN.is_match(l))?;

        let mut summary = PytestSummary {
            duration_secs: DURATION_PATTERN
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            ..Default::default()
        };

        for caps in COUNT_PATTERN.captures_iter(line) {
            let count: usize = caps[1].parse().unwrap_or(0);
            match &caps[2] {
                "passed" => summary.passed = count,
                "failed" => summary.failed = count,
                "error" | "errors" => summary.errors = count,
                "skipped" => summary.skipped = count,
                _ => {}
            }
        }

        Some(summary)
    }
}
