#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Interpreter discovery and naming helpers for hosting submissions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;
use which::which;

use crate::constants::{MODULE_PREFIX, PYTHON_ENV};

/// Finds the Python interpreter used to host submissions.
///
/// An explicit path wins, then `ORDER_GRADER_PYTHON`, then `python3` and
/// `python` on `PATH`.
pub fn python_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(PYTHON_ENV)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path.trim()));
    }

    which("python3")
        .or_else(|_| which("python"))
        .context("Cannot find a Python interpreter on path (python3)")
}

/// A module name no submission or library can already be using.
pub fn unique_module_name() -> String {
    format!("{MODULE_PREFIX}_{}", Uuid::new_v4().simple())
}
