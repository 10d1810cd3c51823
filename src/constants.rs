#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Name of the class every submission must define.
pub const ANALYZER_CLASS: &str = "OrderDataAnalyzer";

/// Title printed in the report header.
pub const REPORT_TITLE: &str = "NumPy Order Analyzer Test Report";

/// `chrono` format string for the report header timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Directory, next to the submission's own directory, that receives the report.
pub const WORKSPACE_DIR: &str = "student_workspace";

/// File name of the persisted report.
pub const REPORT_FILE_NAME: &str = "report.txt";

/// Prefix of the synthetic module name a submission is loaded under.
pub const MODULE_PREFIX: &str = "submission";

/// Environment variable that overrides the Python interpreter used to host
/// submissions.
pub const PYTHON_ENV: &str = "ORDER_GRADER_PYTHON";

/// Environment variable that overrides the per-call timeout, in seconds.
pub const TIMEOUT_ENV: &str = "ORDER_GRADER_TIMEOUT_SECS";

/// Per-call timeout used when neither the CLI nor the environment sets one.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Relative tolerance used by `allclose`-style comparisons.
pub const ALLCLOSE_RTOL: f64 = 1e-5;

/// Absolute tolerance used by `allclose`-style comparisons.
pub const ALLCLOSE_ATOL: f64 = 1e-8;

/// Python source of the host process a submission is loaded into.
///
/// The host reads one JSON request per line on stdin and answers with one
/// JSON reply per line on stdout. Anything the submission prints goes to
/// stderr.
pub const HOST_SCRIPT: &str = include_str!("python/host.py");
