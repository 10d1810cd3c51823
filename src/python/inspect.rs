#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static detection of placeholder method bodies.

use std::collections::BTreeSet;

use anyhow::Result;
use thiserror::Error;
use tree_sitter::Node;

use super::parser::Parser;

/// Names of methods whose body is a stub.
pub type StubFunctionSet = BTreeSet<String>;

/// Errors raised while inspecting a submission.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InspectError {
    /// The submission is not valid Python.
    #[error("Submission has a syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-based line.
        line:   usize,
        /// 1-based column.
        column: usize,
    },
}

/// Node kinds that are literal constants on their own.
const LITERAL_KINDS: [&str; 6] = ["integer", "float", "true", "false", "none", "ellipsis"];

/// Returns the names of all methods, defined directly in a top-level class,
/// whose first statement is `pass` or `return <literal>`.
///
/// `async def` methods are never reported.
pub fn stub_functions(source: &str) -> Result<StubFunctionSet> {
    let parser = Parser::new(source.to_string())?;
    if let Some(at) = parser.first_syntax_error()? {
        return Err(InspectError::Syntax {
            line:   at.line,
            column: at.column,
        }
        .into());
    }

    let root = parser.root_node()?;
    let mut stubs = StubFunctionSet::new();
    let mut cursor = root.walk();

    for class in root
        .named_children(&mut cursor)
        .map(definition)
        .filter(|n| n.kind() == "class_definition")
    {
        let Some(body) = class.child_by_field_name("body") else {
            continue;
        };
        let mut body_cursor = body.walk();
        for method in body
            .named_children(&mut body_cursor)
            .map(definition)
            .filter(|n| n.kind() == "function_definition" && !is_async(*n))
        {
            let Some(name) = method.child_by_field_name("name") else {
                continue;
            };
            if is_stub(&parser, method)? {
                stubs.insert(parser.text(name)?.to_string());
            }
        }
    }

    tracing::debug!("Stub methods: {:?}", stubs);
    Ok(stubs)
}

/// Looks through a decorator wrapper to the definition it decorates.
fn definition(node: Node<'_>) -> Node<'_> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

/// Whether a function is declared with `async def`.
fn is_async(function: Node<'_>) -> bool {
    let mut cursor = function.walk();
    function
        .children(&mut cursor)
        .any(|child| child.kind() == "async")
}

/// The first named, non-comment child of a node.
fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() != "comment")
}

/// Whether a function's first statement makes it a stub.
fn is_stub(parser: &Parser, function: Node<'_>) -> Result<bool> {
    let Some(statement) = function
        .child_by_field_name("body")
        .and_then(first_named)
    else {
        return Ok(true);
    };

    match statement.kind() {
        "pass_statement" => Ok(true),
        "return_statement" => match first_named(statement) {
            Some(value) => is_literal(parser, value),
            None => Ok(false),
        },
        _ => Ok(false),
    }
}

/// Whether an expression is a literal constant.
fn is_literal(parser: &Parser, expr: Node<'_>) -> Result<bool> {
    match expr.kind() {
        kind if LITERAL_KINDS.contains(&kind) => Ok(true),
        "string" => is_plain_string(parser, expr),
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts: Vec<Node<'_>> = expr
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .collect();
            for part in parts {
                if !is_plain_string(parser, part)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "parenthesized_expression" => match first_named(expr) {
            Some(inner) => is_literal(parser, inner),
            None => Ok(false),
        },
        _ => Ok(false),
    }
}

/// Whether a string node is a constant, i.e. not an f-string or t-string.
fn is_plain_string(parser: &Parser, node: Node<'_>) -> Result<bool> {
    if node.kind() != "string" {
        return Ok(false);
    }
    let text = parser.text(node)?;
    let prefix = text
        .split(['\'', '"'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    Ok(!prefix.contains('f') && !prefix.contains('t'))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wraps method definitions in an analyzer class.
    fn class_with(methods: &str) -> String {
        format!("import numpy as np\n\nclass OrderDataAnalyzer:\n{methods}")
    }

    #[test]
    fn pass_and_constant_returns_are_stubs() {
        let source = class_with(
            r#"
    def create_order_array(self, orders):
        pass

    def validate_order_array(self, arr):
        return False

    def format_order_amounts(self, arr):
        return "$100.00"

    def compute_order_summary(self, arr):
        return (None)

    def flag_high_value_orders(self, arr):
        return ...
"#,
        );
        let stubs = stub_functions(&source).expect("inspect");
        assert_eq!(
            stubs.into_iter().collect::<Vec<_>>(),
            [
                "compute_order_summary",
                "create_order_array",
                "flag_high_value_orders",
                "format_order_amounts",
                "validate_order_array",
            ]
        );
    }

    #[test]
    fn real_bodies_are_not_stubs() {
        let source = class_with(
            r#"
    def apply_discount(self, arr):
        return arr

    def create_order_array(self, orders):
        return np.array(orders, dtype=float)

    def validate_order_array(self, arr):
        return -1

    def compute_order_summary(self, arr):
        return (1.0, 2.0, 3.0)

    def format_order_amounts(self, arr):
        return f"${arr[0]:.2f}"

    def flag_high_value_orders(self, arr):
        return
"#,
        );
        assert!(stub_functions(&source).expect("inspect").is_empty());
    }

    #[test]
    fn only_the_first_statement_counts() {
        let source = class_with(
            r#"
    def apply_discount(self, arr):
        """Takes 10% off large orders."""
        pass

    def validate_order_array(self, arr):
        # placeholder
        return True

    def format_order_amounts(self, arr):
        out = [f"${x:.2f}" for x in arr]
        return "unused"
"#,
        );
        let stubs = stub_functions(&source).expect("inspect");
        assert_eq!(stubs.into_iter().collect::<Vec<_>>(), ["validate_order_array"]);
    }

    #[test]
    fn decorated_methods_are_inspected() {
        let source = class_with(
            r#"
    @staticmethod
    def apply_discount(arr):
        return 0
"#,
        );
        let stubs = stub_functions(&source).expect("inspect");
        assert_eq!(stubs.into_iter().collect::<Vec<_>>(), ["apply_discount"]);
    }

    #[test]
    fn async_methods_are_skipped() {
        let source = class_with(
            r#"
    async def compute_order_summary(self, arr):
        pass

    @staticmethod
    async def apply_discount(arr):
        return 0

    def validate_order_array(self, arr):
        return False
"#,
        );
        let stubs = stub_functions(&source).expect("inspect");
        assert_eq!(stubs.into_iter().collect::<Vec<_>>(), ["validate_order_array"]);
    }

    #[test]
    fn module_functions_and_nested_classes_are_ignored() {
        let source = r#"
def helper():
    pass

class OrderDataAnalyzer:
    class Inner:
        def hidden(self):
            pass

    def apply_discount(self, arr):
        return "b" "c"
"#;
        let stubs = stub_functions(source).expect("inspect");
        assert_eq!(stubs.into_iter().collect::<Vec<_>>(), ["apply_discount"]);
    }

    #[test]
    fn malformed_source_is_fatal() {
        let err = stub_functions("class OrderDataAnalyzer:\n    def f(self)\n        pass\n")
            .expect_err("syntax error");
        assert!(matches!(
            err.downcast_ref::<InspectError>(),
            Some(InspectError::Syntax { .. })
        ));
    }
}
