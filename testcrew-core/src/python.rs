//! Tree-sitter helpers shared by the Python analyzer and validator

use std::ops::ControlFlow;
use tree_sitter::{Node, Parser, Tree};

/// Deepest syntax tree accepted; CPython refuses far shallower nesting
pub(crate) const MAX_NESTING_DEPTH: usize = 1000;

pub(crate) fn parse(source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| format!("Python grammar unavailable: {e}"))?;

    parser.parse(source, None).ok_or_else(|| "parser produced no tree".to_string())
}

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// 1-based `line:column` of a node's start
pub(crate) fn location(node: Node<'_>) -> (usize, usize) {
    let pos = node.start_position();
    (pos.row + 1, pos.column + 1)
}

/// Pre-order walk over `root` and its descendants using a cursor
///
/// `visit` receives each node with its depth below `root` and answers
/// whether to descend into the node's children. The walk stops early on
/// `Break`, whose value is returned.
pub(crate) fn walk<'t, B>(
    root: Node<'t>,
    mut visit: impl FnMut(Node<'t>, usize) -> ControlFlow<B, bool>,
) -> Option<B> {
    let mut cursor = root.walk();
    let mut depth = 0;

    loop {
        match visit(cursor.node(), depth) {
            ControlFlow::Break(value) => return Some(value),
            ControlFlow::Continue(true) if cursor.goto_first_child() => {
                depth += 1;
                continue;
            }
            ControlFlow::Continue(_) => {}
        }

        loop {
            if depth == 0 {
                return None;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
        }
    }
}

/// First ERROR or MISSING node in pre-order
pub(crate) fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    walk(root, |node, _| {
        if node.is_error() || node.is_missing() {
            ControlFlow::Break(node)
        } else {
            ControlFlow::Continue(node.has_error())
        }
    })
}

/// First node nested deeper than [`MAX_NESTING_DEPTH`]
pub(crate) fn too_deep(root: Node<'_>) -> Option<Node<'_>> {
    walk(root, |node, depth| {
        if depth > MAX_NESTING_DEPTH {
            ControlFlow::Break(node)
        } else {
            ControlFlow::Continue(true)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_preorder() {
        let tree = parse("def f(a):\n    return a\n\nclass C:\n    pass\n").unwrap();
        let mut kinds = Vec::new();
        walk::<()>(tree.root_node(), |node, depth| {
            if node.is_named() && depth <= 1 {
                kinds.push(node.kind());
            }
            ControlFlow::Continue(true)
        });
        assert_eq!(kinds, ["module", "function_definition", "class_definition"]);
    }

    #[test]
    fn test_walk_skips_pruned_subtrees() {
        let tree = parse("def f(a):\n    return a\n").unwrap();
        let mut visited = 0;
        walk::<()>(tree.root_node(), |_, depth| {
            visited += 1;
            ControlFlow::Continue(depth == 0)
        });
        // module plus its single function definition
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 50_000;
        let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let tree = parse(&source).unwrap();

        assert!(first_error(tree.root_node()).is_none());
        assert!(too_deep(tree.root_node()).is_some());
    }
}
