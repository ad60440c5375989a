//! Python analyzer backed by tree-sitter

use super::{SUMMARY_FAILURE_PREFIX, StructuralAnalyzer};
use crate::error::{GenerationError, ParseError};
use crate::generator::{DEFAULT_GENERATION_TIMEOUT, Generator, generate_with_timeout, prompts};
use crate::model::{AnalysisResult, ClassInfo, FunctionInfo, SourceUnit, dedent};
use crate::python::{
    MAX_NESTING_DEPTH, first_error, location, named_children, node_text, parse, too_deep, walk,
};
use async_trait::async_trait;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tree_sitter::Node;

/// Extracts functions and classes from Python source
///
/// Syntax errors are tolerated as long as some definitions can still be
/// recovered. With a summarizer attached the summary comes from the model,
/// otherwise it is built from the extracted names.
pub struct PythonAnalyzer {
    summarizer: Option<Arc<dyn Generator>>,
    summary_timeout: Duration,
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self { summarizer: None, summary_timeout: DEFAULT_GENERATION_TIMEOUT }
    }

    pub fn with_summarizer(mut self, generator: Arc<dyn Generator>) -> Self {
        self.summarizer = Some(generator);
        self
    }

    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.summary_timeout = timeout;
        self
    }

    /// Functions and classes in declaration order, without a summary
    pub fn extract(
        &self,
        source: &SourceUnit,
    ) -> Result<(Vec<FunctionInfo>, Vec<ClassInfo>), ParseError> {
        let text = source.dedented();
        let tree = parse(&text).map_err(ParseError::new)?;
        let root = tree.root_node();

        if let Some(node) = too_deep(root) {
            let (line, column) = location(node);
            return Err(ParseError::new(format!(
                "nesting exceeds {MAX_NESTING_DEPTH} levels at line {line}, column {column}"
            )));
        }

        let mut functions = Vec::new();
        let mut classes = Vec::new();
        collect(root, &text, &mut functions, &mut classes);

        if let Some(err) = first_error(root) {
            let (line, column) = location(err);
            if functions.is_empty() && classes.is_empty() {
                return Err(ParseError::new(format!(
                    "invalid syntax at line {line}, column {column} and no definitions recovered"
                )));
            }
            warn!(line, column, "Source has syntax errors, continuing with recovered definitions");
        }

        Ok((functions, classes))
    }

    async fn summarize(
        &self,
        source: &SourceUnit,
        functions: &[FunctionInfo],
        classes: &[ClassInfo],
    ) -> String {
        let Some(generator) = &self.summarizer else {
            return describe(functions, classes);
        };

        let prompt = prompts::summary_prompt(source);
        let reply = generate_with_timeout(generator.as_ref(), &prompt, self.summary_timeout)
            .await
            .and_then(|text| {
                let text = text.trim().to_string();
                if text.is_empty() { Err(GenerationError::EmptyResponse) } else { Ok(text) }
            });

        match reply {
            Ok(summary) => summary,
            Err(e) => {
                warn!(generator = generator.name(), error = %e, "Summary generation failed");
                format!("{SUMMARY_FAILURE_PREFIX}: {e}")
            }
        }
    }
}

#[async_trait]
impl StructuralAnalyzer for PythonAnalyzer {
    async fn analyze(&self, source: &SourceUnit) -> Result<AnalysisResult, ParseError> {
        let (functions, classes) = self.extract(source)?;
        debug!(functions = functions.len(), classes = classes.len(), "Extracted structure");

        let summary = self.summarize(source, &functions, &classes).await;
        Ok(AnalysisResult { functions, classes, summary })
    }
}

fn collect(
    root: Node<'_>,
    src: &str,
    functions: &mut Vec<FunctionInfo>,
    classes: &mut Vec<ClassInfo>,
) {
    walk::<()>(root, |node, _| {
        match node.kind() {
            "function_definition" => {
                if let Some(name) = definition_name(node) {
                    functions.push(FunctionInfo {
                        name: node_text(name, src).to_string(),
                        parameters: node
                            .child_by_field_name("parameters")
                            .map(|p| parameters(p, src))
                            .unwrap_or_default(),
                        docstring: docstring(node, src),
                    });
                }
            }
            "class_definition" => {
                if let Some(name) = definition_name(node) {
                    classes.push(ClassInfo {
                        name: node_text(name, src).to_string(),
                        docstring: docstring(node, src),
                    });
                }
            }
            _ => {}
        }
        ControlFlow::Continue(node.is_named())
    });
}

/// Name node of a definition, unless error recovery invented it
fn definition_name(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("name").filter(|n| !n.is_missing() && n.end_byte() > n.start_byte())
}

/// Named parameters; `*args`, `**kwargs` and bare separators are skipped
fn parameters(node: Node<'_>, src: &str) -> Vec<String> {
    named_children(node)
        .into_iter()
        .filter_map(|param| match param.kind() {
            "identifier" => Some(node_text(param, src).to_string()),
            "typed_parameter" => named_children(param)
                .into_iter()
                .next()
                .filter(|n| n.kind() == "identifier")
                .map(|n| node_text(n, src).to_string()),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
                .map(|n| node_text(n, src).to_string()),
            _ => None,
        })
        .collect()
}

/// Leading string literal of a definition's body
fn docstring(definition: Node<'_>, src: &str) -> Option<String> {
    let body = definition.child_by_field_name("body")?;
    let first = named_children(body).into_iter().find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let literal = named_children(first).into_iter().next()?;
    if literal.kind() != "string" {
        return None;
    }

    let parts = named_children(literal);
    let is_fstring = parts.iter().any(|p| {
        p.kind() == "string_start" && node_text(*p, src).to_ascii_lowercase().contains('f')
    });
    if is_fstring {
        return None;
    }

    let content: String = parts
        .iter()
        .filter(|p| p.kind() == "string_content")
        .map(|p| node_text(*p, src))
        .collect();
    clean_docstring(&content)
}

/// First line trimmed, remaining lines dedented, surrounding blank lines dropped
fn clean_docstring(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut lines = trimmed.lines();
    let first = lines.next().unwrap_or_default().trim();
    let rest = dedent(&lines.collect::<Vec<_>>().join("\n"));
    let rest = rest.trim();

    if rest.is_empty() { Some(first.to_string()) } else { Some(format!("{first}\n{rest}")) }
}

fn describe(functions: &[FunctionInfo], classes: &[ClassInfo]) -> String {
    fn part(singular: &str, plural: &str, names: &[&str]) -> String {
        match names {
            [] => format!("no {plural}"),
            [only] => format!("1 {singular} ({only})"),
            _ => format!("{} {plural} ({})", names.len(), names.join(", ")),
        }
    }

    let function_names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    let class_names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    format!(
        "Defines {} and {}.",
        part("function", "functions", &function_names),
        part("class", "classes", &class_names),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const SAMPLE: &str = r#"
import math

def divide(a, b):
    """Divide a by b.

        Raises ZeroDivisionError when b is zero.
    """
    return a / b

class Shape:
    """A shape."""

    def area(self, scale: float = 1.0, *args, **kwargs):
        # no docstring here
        return 0

@cached
def hypot(x: float, y: float, *, exact=False):
    return math.sqrt(x * x + y * y)
"#;

    #[test]
    fn test_extracts_in_declaration_order() {
        let (functions, classes) =
            PythonAnalyzer::new().extract(&SourceUnit::new(SAMPLE)).unwrap();

        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["divide", "area", "hypot"]);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Shape");
        assert_eq!(classes[0].docstring.as_deref(), Some("A shape."));
    }

    #[test]
    fn test_parameters_and_docstrings() {
        let (functions, _) = PythonAnalyzer::new().extract(&SourceUnit::new(SAMPLE)).unwrap();

        assert_eq!(functions[0].parameters, ["a", "b"]);
        assert_eq!(
            functions[0].docstring.as_deref(),
            Some("Divide a by b.\nRaises ZeroDivisionError when b is zero.")
        );
        assert_eq!(functions[1].parameters, ["self", "scale"]);
        assert_eq!(functions[1].docstring, None);
        assert_eq!(functions[2].parameters, ["x", "y", "exact"]);
    }

    #[test]
    fn test_indented_snippet() {
        let source = SourceUnit::new("    def f(x):\n        return x\n");
        let (functions, _) = PythonAnalyzer::new().extract(&source).unwrap();
        assert_eq!(functions[0].name, "f");
    }

    #[test]
    fn test_unparseable_source() {
        let result = PythonAnalyzer::new().extract(&SourceUnit::new("def (:\n  ]]]"));
        assert!(result.is_err());
    }

    #[test]
    fn test_recovers_around_errors() {
        let source = SourceUnit::new("def ok(a):\n    return a\n\nx = (\n");
        let (functions, _) = PythonAnalyzer::new().extract(&source).unwrap();
        assert_eq!(functions[0].name, "ok");
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let depth = 50_000;
        let source =
            format!("def f(a):\n    return {}a{}\n", "(".repeat(depth), ")".repeat(depth));

        let err = PythonAnalyzer::new().extract(&SourceUnit::new(source)).unwrap_err();
        assert!(err.to_string().contains("nesting exceeds"), "{err}");
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("def f(a):\n    return {}a{}\n", "(".repeat(50), ")".repeat(50));
        let (functions, _) = PythonAnalyzer::new().extract(&SourceUnit::new(source)).unwrap();
        assert_eq!(functions[0].name, "f");
    }

    #[tokio::test]
    async fn test_structural_summary() {
        let analysis = PythonAnalyzer::new().analyze(&SourceUnit::new(SAMPLE)).await.unwrap();
        assert_eq!(
            analysis.summary,
            "Defines 3 functions (divide, area, hypot) and 1 class (Shape)."
        );

        let analysis = PythonAnalyzer::new().analyze(&SourceUnit::new("x = 1\n")).await.unwrap();
        assert_eq!(analysis.summary, "Defines no functions and no classes.");
        assert!(analysis.is_empty());
    }

    #[tokio::test]
    async fn test_model_summary() {
        let generator = Arc::new(ScriptedGenerator::always("  Divides numbers.\n"));
        let analyzer = PythonAnalyzer::new().with_summarizer(generator.clone());

        let analysis = analyzer.analyze(&SourceUnit::new(SAMPLE)).await.unwrap();
        assert_eq!(analysis.summary, "Divides numbers.");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_summary_failure_is_not_fatal() {
        let generator = Arc::new(ScriptedGenerator::failing(GenerationError::quota("daily limit")));
        let analyzer = PythonAnalyzer::new().with_summarizer(generator);

        let analysis = analyzer.analyze(&SourceUnit::new(SAMPLE)).await.unwrap();
        assert!(analysis.summary.starts_with(SUMMARY_FAILURE_PREFIX));
        assert!(analysis.summary.contains("daily limit"));
        assert_eq!(analysis.functions.len(), 3);
    }
}
