#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Behavioural checks against a loaded analyzer: sanity probes, the test
//! matrix, the verdict for each case and the report they produce.

/// Fixed sanity checks run once on a single instance.
pub mod probes;
/// The eight graded test cases.
pub mod matrix;
/// Report header, console echo and persistence.
pub mod report;
/// Per-case verdicts and their report lines.
pub mod verdict;

use std::time::Duration;

use thiserror::Error;

use crate::{types::Method, value::Value};

/// What a method call returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// The returned value.
    pub value:    Value,
    /// Python's `str()` of the returned value.
    pub rendered: String,
}

impl Invocation {
    /// Wraps a value, rendering it the way Python's `str()` would.
    pub fn new(value: Value) -> Self {
        let rendered = value.to_string();
        Self { value, rendered }
    }
}

/// Why a constructor or method call produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The analyzer raised an exception.
    #[error("{message}")]
    Raised {
        /// Exception class name.
        exception: String,
        /// `str()` of the exception.
        message:   String,
    },
    /// The call did not return in time.
    #[error("call timed out after {timeout:?}")]
    TimedOut {
        /// The limit that was exceeded.
        timeout: Duration,
    },
    /// The process hosting the analyzer went away mid-call.
    #[error("analyzer host exited: {reason}")]
    HostExited {
        /// What was observed.
        reason: String,
    },
    /// The instance belonged to a host that has since been replaced.
    #[error("analyzer instance no longer exists")]
    StaleInstance,
    /// The host replied with something unintelligible.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A loaded analyzer class that can be instantiated and called.
///
/// Calls are strictly sequential; every future is awaited before the next
/// call starts.
#[allow(async_fn_in_trait)]
pub trait Analyzer {
    /// Handle to one instance of the class.
    type Instance;

    /// Calls the class's zero-argument constructor.
    async fn construct(&mut self) -> Result<Self::Instance, InvocationError>;

    /// Calls `method` on `instance` with one argument.
    async fn invoke(
        &mut self,
        instance: &Self::Instance,
        method: Method,
        arg: &Value,
    ) -> Result<Invocation, InvocationError>;

    /// Lets go of an instance that is no longer needed.
    async fn release(&mut self, instance: Self::Instance);
}
