#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # order-grader
//!
//! Command line entry point for grading NumPy order analyzer submissions.
//!
//! `order-grader grade path/to/submission.py` prints one line per test case
//! and writes `student_workspace/report.txt` next to the submission's
//! directory. `order-grader stubs path/to/submission.py` only lists the
//! methods that look like placeholders.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use order_grader::{config::GraderConfig, python::inspect::stub_functions};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::SubscriberInitExt};

/// Options for a grading run.
#[derive(Debug, Clone)]
struct GradeOpts {
    /// Where to write the report instead of the default.
    report:     Option<PathBuf>,
    /// Interpreter to host the submission with.
    python:     Option<PathBuf>,
    /// Per-call timeout in seconds.
    timeout:    Option<u64>,
    /// The submission.
    submission: PathBuf,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a submission
    Grade(GradeOpts),
    /// List stub methods
    Stubs(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the submission path
    fn s() -> impl Parser<PathBuf> {
        positional("SUBMISSION").help("Path to the learner's .py file")
    }

    let report = long("report")
        .help("Write the report here instead of ../student_workspace/report.txt")
        .argument::<PathBuf>("PATH")
        .optional();
    let python = long("python")
        .help("Python interpreter with NumPy installed")
        .argument::<PathBuf>("PATH")
        .optional();
    let timeout = long("timeout")
        .help("Seconds a single constructor or method call may take")
        .argument::<u64>("SECS")
        .guard(|secs| *secs > 0, "timeout must be positive")
        .optional();
    let submission = s();

    let grade = construct!(GradeOpts {
        report,
        python,
        timeout,
        submission
    })
    .map(Cmd::Grade)
    .to_options()
    .command("grade")
    .help("Grade a submission and write its report");

    let stubs = construct!(Cmd::Stubs(s()))
        .to_options()
        .command("stubs")
        .help("List methods whose body is a placeholder");

    let cmd = construct!([grade, stubs]);

    cmd.to_options()
        .descr("Grader for the NumPy order analyzer exercise")
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(Level::INFO).into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Grade(opts) => {
            let config = GraderConfig::builder()
                .submission(opts.submission)
                .maybe_report_path(opts.report)
                .maybe_python(opts.python)
                .maybe_call_timeout(opts.timeout.map(Duration::from_secs))
                .build();
            order_grader::grade(&config).await?;
        }
        Cmd::Stubs(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            for name in stub_functions(&source)? {
                println!("{name}");
            }
        }
    };

    Ok(())
}
