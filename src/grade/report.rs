#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use crate::constants::{REPORT_TITLE, TIMESTAMP_FORMAT};

/// The report being accumulated: a header and one line per test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Title and timestamp line.
    header: String,
    /// Case lines, in matrix order.
    lines:  Vec<String>,
    /// Echo each case line to stdout as it is pushed.
    echo:   bool,
}

impl Report {
    /// Starts a report stamped with `at`.
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            header: format!("=== {REPORT_TITLE} - {} ===", at.format(TIMESTAMP_FORMAT)),
            lines:  Vec::new(),
            echo:   true,
        }
    }

    /// Starts a report stamped with the current local time.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Stops case lines from being printed as they arrive.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// The header line.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Appends a case line, printing it first.
    pub fn push(&mut self, line: String) {
        if self.echo {
            println!("{line}");
        }
        self.lines.push(line);
    }

    /// Case lines so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Header and case lines joined with newlines, with a trailing newline.
    pub fn text(&self) -> String {
        let mut text = std::iter::once(self.header.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        text
    }

    /// Writes the report to `path`, replacing any previous report and
    /// creating missing parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        std::fs::write(path, self.text())
            .with_context(|| format!("Could not write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    /// 2024-03-09 07:05:03.
    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 3))
            .expect("valid timestamp")
    }

    #[test]
    fn header_carries_a_zero_padded_timestamp() {
        let report = Report::new(stamp());
        assert_eq!(
            report.header(),
            "=== NumPy Order Analyzer Test Report - 2024-03-09 07:05:03 ==="
        );
    }

    #[test]
    fn text_is_newline_joined_with_a_trailing_newline() {
        let mut report = Report::new(stamp()).quiet();
        report.push("✅ Visible TC1: Create Order Array".into());
        report.push("❌ Hidden TC7: Validate Empty failed | Reason: Hardcoded/stub function".into());
        assert_eq!(
            report.text(),
            "=== NumPy Order Analyzer Test Report - 2024-03-09 07:05:03 ===\n\
             ✅ Visible TC1: Create Order Array\n\
             ❌ Hidden TC7: Validate Empty failed | Reason: Hardcoded/stub function\n"
        );
    }

    #[test]
    fn empty_report_is_just_the_header() {
        let report = Report::new(stamp());
        assert_eq!(report.lines().len(), 0);
        assert!(report.text().ends_with("===\n"));
    }
}
