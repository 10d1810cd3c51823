#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tree-sitter parser wrapper for Python source code.

use std::fmt::Formatter;

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Node, Tree};

/// A struct that wraps a tree-sitter parse tree and the source it came from.
#[derive(Clone)]
pub struct Parser {
    /// The source code being parsed.
    code:  String,
    /// The parse tree.
    _tree: Option<Tree>,
}

/// Returns the compiled tree-sitter Python language.
fn python_language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lines", &self.line_count())
            .finish()
    }
}

/// Where the first syntax error in a parse tree sits, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxErrorAt {
    /// Line of the offending token.
    pub line:   usize,
    /// Column of the offending token.
    pub column: usize,
}

impl Parser {
    /// Returns a new parser object.
    ///
    /// * `source_code`: the source code to be parsed
    pub fn new(source_code: String) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        let language = python_language();

        parser
            .set_language(&language)
            .with_context(|| "Failed to load Python grammar")?;
        let tree = parser
            .parse(source_code.as_str(), None)
            .ok_or_else(|| anyhow!("Error parsing Python code"))?;

        Ok(Self {
            code:  source_code,
            _tree: Some(tree),
        })
    }

    /// Returns the parse tree's root node.
    pub fn root_node(&self) -> Result<Node<'_>> {
        self._tree
            .as_ref()
            .map(Tree::root_node)
            .context("Treesitter could not parse code")
    }

    /// Returns the source text a node spans.
    pub fn text(&self, node: Node<'_>) -> Result<&str> {
        node.utf8_text(self.code.as_bytes())
            .context("Cannot map node to source text")
    }

    /// Finds the first `ERROR` or `MISSING` node, if the source doesn't parse
    /// cleanly.
    pub fn first_syntax_error(&self) -> Result<Option<SyntaxErrorAt>> {
        let root = self.root_node()?;
        if !root.has_error() {
            return Ok(None);
        }

        let mut cursor = root.walk();
        loop {
            let node = cursor.node();
            if node.is_error() || node.is_missing() {
                let start = node.start_position();
                return Ok(Some(SyntaxErrorAt {
                    line:   start.row + 1,
                    column: start.column + 1,
                }));
            }

            let descend = node.has_error() && cursor.goto_first_child();
            if descend {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    // `has_error` was set but no node claimed it; point at the root.
                    let start = root.start_position();
                    return Ok(Some(SyntaxErrorAt {
                        line:   start.row + 1,
                        column: start.column + 1,
                    }));
                }
            }
        }
    }

    /// Returns the total number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_has_no_syntax_error() {
        let parser = Parser::new("class A:\n    def f(self):\n        return 1\n".into()).expect("parse");
        assert_eq!(parser.first_syntax_error().expect("walk"), None);
        assert_eq!(parser.line_count(), 3);
    }

    #[test]
    fn broken_source_reports_a_position() {
        let parser = Parser::new("class A:\n    def f(self)\n        return 1\n".into()).expect("parse");
        let at = parser
            .first_syntax_error()
            .expect("walk")
            .expect("syntax error");
        assert!((1..=2).contains(&at.line), "unexpected position {at:?}");
    }
}
