#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use bon::Builder;

use crate::constants::{
    ANALYZER_CLASS, DEFAULT_CALL_TIMEOUT_SECS, REPORT_FILE_NAME, TIMEOUT_ENV, WORKSPACE_DIR,
};

/// Everything a grading run needs to know.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct GraderConfig {
    /// Path to the learner's `.py` file.
    #[builder(into)]
    submission:   PathBuf,
    /// Where the report goes; see [`GraderConfig::report_path`].
    #[builder(into)]
    report_path:  Option<PathBuf>,
    /// Interpreter used to host the submission.
    #[builder(into)]
    python:       Option<PathBuf>,
    /// How long one constructor or method call may take.
    #[builder(default = default_call_timeout())]
    call_timeout: Duration,
    /// Name of the class the submission must define.
    #[builder(default = ANALYZER_CLASS.to_string())]
    class_name:   String,
}

impl GraderConfig {
    /// Path to the submission.
    pub fn submission(&self) -> &Path {
        &self.submission
    }

    /// The report path, defaulting to `student_workspace/report.txt` next to
    /// the directory holding the submission.
    pub fn report_path(&self) -> PathBuf {
        if let Some(path) = &self.report_path {
            return path.clone();
        }
        let dir = self
            .submission
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        dir.join("..").join(WORKSPACE_DIR).join(REPORT_FILE_NAME)
    }

    /// Explicit interpreter, if any.
    pub fn python(&self) -> Option<&Path> {
        self.python.as_deref()
    }

    /// Per-call timeout.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Analyzer class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Reads the submission source.
    pub fn read_submission(&self) -> Result<String> {
        std::fs::read_to_string(&self.submission)
            .with_context(|| format!("Could not read submission {}", self.submission.display()))
    }
}

/// The per-call timeout from `ORDER_GRADER_TIMEOUT_SECS`, or 30 seconds.
pub fn default_call_timeout() -> Duration {
    let secs = std::env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults_next_to_the_submission_directory() {
        let config = GraderConfig::builder()
            .submission("course/submissions/order_analyzer.py")
            .build();
        assert_eq!(
            config.report_path(),
            PathBuf::from("course/submissions/../student_workspace/report.txt")
        );
        assert_eq!(config.class_name(), "OrderDataAnalyzer");
    }

    #[test]
    fn bare_file_name_uses_the_current_directory() {
        let config = GraderConfig::builder().submission("analyzer.py").build();
        assert_eq!(
            config.report_path(),
            PathBuf::from("./../student_workspace/report.txt")
        );
    }

    #[test]
    fn explicit_settings_win() {
        let config = GraderConfig::builder()
            .submission("a/b.py")
            .report_path("out/report.txt")
            .python("/usr/bin/python3.12")
            .call_timeout(Duration::from_secs(2))
            .build();
        assert_eq!(config.report_path(), PathBuf::from("out/report.txt"));
        assert_eq!(config.python(), Some(Path::new("/usr/bin/python3.12")));
        assert_eq!(config.call_timeout(), Duration::from_secs(2));
    }
}
