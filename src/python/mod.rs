#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Everything that touches Python: parsing submissions and hosting them.

/// Loading and driving a submission in a Python host process.
pub mod host;
/// Stub detection over the submission's syntax tree.
pub mod inspect;
/// Tree-sitter wrapper.
pub mod parser;
/// Interpreter discovery and module naming.
pub mod util;
