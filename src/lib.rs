//! # order-grader
//!
//! Grades learner submissions of the NumPy order analyzer exercise: finds
//! stubbed methods in the source, loads the submission into an isolated
//! Python host, runs sanity probes and the fixed test matrix, and writes a
//! plain-text report.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Run configuration
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Probes, test matrix, verdicts and the report
pub mod grade;
/// Long-lived child processes with a line protocol
pub mod process;
/// Parsing and hosting Python submissions
pub mod python;
/// Shared enums naming the exercise's methods and case visibility
pub mod types;
/// Python values exchanged with the analyzer
pub mod value;

use anyhow::{Context, Result};
use config::GraderConfig;
use grade::{
    Analyzer,
    matrix::run_matrix,
    probes::run_probes,
    report::Report,
};
use python::{
    host::AnalyzerModule,
    inspect::{StubFunctionSet, stub_functions},
};

/// Grades the configured submission end to end and writes its report.
///
/// Inspection and loading failures abort before any report exists.
pub async fn grade(config: &GraderConfig) -> Result<Report> {
    let source = config.read_submission()?;
    let stubs = stub_functions(&source).with_context(|| {
        format!("Could not inspect {}", config.submission().display())
    })?;
    tracing::info!("Found {} stub method(s)", stubs.len());

    let mut module = AnalyzerModule::load(config).await?;
    let report = grade_with(&mut module, &stubs, Report::now()).await;
    module.shutdown().await;
    let report = report?;

    report.write_to(&config.report_path())?;
    Ok(report)
}

/// Runs probes and the test matrix against an already loaded analyzer,
/// filling in `report`.
pub async fn grade_with<A: Analyzer>(
    analyzer: &mut A,
    stubs: &StubFunctionSet,
    mut report: Report,
) -> Result<Report> {
    let probe_failures = run_probes(analyzer).await?;
    run_matrix(analyzer, &probe_failures, stubs, &mut report).await;
    Ok(report)
}
