use super::LintValidator;
use crate::model::{ValidationVerdict, char_prefix};
use crate::python::{MAX_NESTING_DEPTH, location, node_text, parse, too_deep, walk};
use std::ops::ControlFlow;
use tracing::debug;
use tree_sitter::Node;

/// Syntax errors reported before the rest are summarized
const MAX_REPORTED_ERRORS: usize = 10;

/// Characters of offending text quoted in a diagnostic
const SNIPPET_CHARS: usize = 40;

/// Parses candidate code as Python and checks it defines pytest tests
pub struct PythonSyntaxValidator {
    require_tests: bool,
}

impl Default for PythonSyntaxValidator {
    fn default() -> Self {
        Self { require_tests: true }
    }
}

impl PythonSyntaxValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether code without any `test_*` function is rejected
    pub fn with_require_tests(mut self, require: bool) -> Self {
        self.require_tests = require;
        self
    }
}

impl LintValidator for PythonSyntaxValidator {
    fn validate(&self, code: &str) -> ValidationVerdict {
        if code.trim().is_empty() {
            return ValidationVerdict::rejected(vec!["test code is empty".to_string()]);
        }

        let tree = match parse(code) {
            Ok(tree) => tree,
            Err(e) => return ValidationVerdict::rejected(vec![format!("validator error: {e}")]),
        };
        let root = tree.root_node();

        let errors = syntax_errors(root, code);
        let mut issues: Vec<String> = errors.iter().take(MAX_REPORTED_ERRORS).cloned().collect();
        if errors.len() > MAX_REPORTED_ERRORS {
            let hidden = errors.len() - MAX_REPORTED_ERRORS;
            issues.push(format!("... and {hidden} more syntax errors"));
        }

        if let Some(node) = too_deep(root) {
            let (line, column) = location(node);
            issues.push(format!(
                "line {line}, column {column}: nesting exceeds {MAX_NESTING_DEPTH} levels"
            ));
        }

        if self.require_tests && !defines_test(root, code) {
            issues.push("no test functions found (expected `def test_*`)".to_string());
        }

        debug!(issues = issues.len(), "Validated candidate");
        if issues.is_empty() {
            ValidationVerdict::accepted()
        } else {
            ValidationVerdict::rejected(issues)
        }
    }
}

fn syntax_errors(root: Node<'_>, src: &str) -> Vec<String> {
    let mut out = Vec::new();
    walk::<()>(root, |node, _| {
        let (line, column) = location(node);
        if node.is_missing() {
            out.push(format!(
                "SyntaxError: line {line}, column {column}: missing `{}`",
                node.kind()
            ));
            return ControlFlow::Continue(false);
        }
        if node.is_error() {
            let text = node_text(node, src).lines().next().unwrap_or_default().trim();
            out.push(format!(
                "SyntaxError: line {line}, column {column}: unexpected `{}`",
                char_prefix(text, SNIPPET_CHARS)
            ));
            return ControlFlow::Continue(false);
        }
        ControlFlow::Continue(node.has_error())
    });
    out
}

/// True if any function, at any depth, is named `test*`
fn defines_test(root: Node<'_>, src: &str) -> bool {
    walk(root, |node, _| {
        let is_test = node.kind() == "function_definition"
            && node
                .child_by_field_name("name")
                .is_some_and(|name| node_text(name, src).starts_with("test"));
        if is_test { ControlFlow::Break(()) } else { ControlFlow::Continue(true) }
    })
    .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pytest_module() {
        let code =
            "from source_under_test import *\n\ndef test_divide():\n    assert divide(6, 3) == 2\n";
        let verdict = PythonSyntaxValidator::new().validate(code);
        assert!(verdict.valid, "{:?}", verdict.issues);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn test_accepts_test_methods() {
        let code = "class TestDivide:\n    def test_one(self):\n        assert 1\n";
        assert!(PythonSyntaxValidator::new().validate(code).valid);
    }

    #[test]
    fn test_rejects_syntax_errors_with_location() {
        let code = "def test_broken(:\n    assert True\n";
        let verdict = PythonSyntaxValidator::new().validate(code);
        assert!(!verdict.valid);
        assert!(verdict.issues.iter().any(|i| i.starts_with("SyntaxError: line ")));
    }

    #[test]
    fn test_rejects_empty_and_testless_code() {
        let verdict = PythonSyntaxValidator::new().validate("   \n");
        assert!(!verdict.valid);
        assert_eq!(verdict.issues, ["test code is empty"]);

        let verdict = PythonSyntaxValidator::new().validate("# Error generating tests: quota\n");
        assert!(!verdict.valid);
        assert!(verdict.issues[0].contains("no test functions"));

        let relaxed = PythonSyntaxValidator::new().with_require_tests(false);
        assert!(relaxed.validate("x = 1\n").valid);
    }

    #[test]
    fn test_caps_reported_errors() {
        let code = (0..30).map(|i| format!("def test_{i}(:\n    pass\n")).collect::<String>();
        let verdict = PythonSyntaxValidator::new().validate(&code);
        assert!(!verdict.valid);
        assert!(verdict.issues.len() <= MAX_REPORTED_ERRORS + 2);
    }

    #[test]
    fn test_deeply_nested_code_is_rejected() {
        let depth = 50_000;
        let code = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));

        let verdict = PythonSyntaxValidator::new().validate(&code);
        assert!(!verdict.valid);
        assert!(verdict.issues.iter().any(|i| i.contains("nesting exceeds")));
        assert!(verdict.issues.iter().any(|i| i.contains("no test functions")));
    }
}
