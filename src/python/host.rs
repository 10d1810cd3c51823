#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Loads a submission into a Python host process and drives it.

use std::{ffi::OsString, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::util::{python_path, unique_module_name};
use crate::{
    config::GraderConfig,
    constants::HOST_SCRIPT,
    grade::{Analyzer, Invocation, InvocationError},
    process::{ExchangeError, LineProcess},
    types::Method,
    value::Value,
};

/// Time a host gets to exit on its own after its stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Reasons a submission could not be loaded. All of them end the run.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Loading the submission raised, or the class is missing.
    #[error("Could not load {}: {exception}: {message}", path.display())]
    Submission {
        /// The submission.
        path:      PathBuf,
        /// Exception class name.
        exception: String,
        /// `str()` of the exception.
        message:   String,
        /// Formatted Python traceback.
        traceback: String,
    },
    /// The host never said it was ready.
    #[error("Python host for {} did not start: {reason}", path.display())]
    Handshake {
        /// The submission.
        path:   PathBuf,
        /// What went wrong.
        reason: String,
    },
}

/// A request line sent to the host.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    /// Instantiate the analyzer class.
    Construct,
    /// Call a method on an instance.
    Invoke {
        /// Host-side instance id.
        instance: u64,
        /// Method name.
        method:   &'a str,
        /// The single argument.
        arg:      &'a Value,
    },
    /// Forget an instance.
    Release {
        /// Host-side instance id.
        instance: u64,
    },
}

/// A reply line read from the host.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Reply {
    /// The submission loaded.
    Ready {
        /// Name it was loaded under.
        module: String,
    },
    /// A new instance exists.
    Constructed {
        /// Host-side instance id.
        instance: u64,
    },
    /// A method returned.
    Returned {
        /// The returned value.
        value:    Value,
        /// `str()` of the returned value.
        rendered: String,
    },
    /// An instance was forgotten.
    Released,
    /// Python raised.
    Raised {
        /// Exception class name.
        exception: String,
        /// `str()` of the exception.
        message:   String,
        /// Formatted traceback.
        #[serde(default)]
        traceback: String,
    },
}

/// Handle to an analyzer instance living in a particular host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceHandle {
    /// Which host process the instance belongs to.
    generation: u64,
    /// Host-side instance id.
    id:         u64,
}

/// A submission's analyzer class, loaded into a Python host.
///
/// A host that times out or dies is killed and a new one is started on the
/// next call. Instances created by the old host are then stale.
#[derive(Debug)]
pub struct AnalyzerModule {
    /// Where the submission lives and how to run it.
    config:      GraderConfig,
    /// Interpreter that runs the host.
    python:      PathBuf,
    /// The live host, if any.
    process:     Option<LineProcess>,
    /// Bumped every time a host is started.
    generation:  u64,
    /// The unique name the submission is loaded under.
    module_name: String,
}

impl AnalyzerModule {
    /// Loads the submission and extracts its analyzer class.
    ///
    /// Any error here is fatal for the grading run.
    pub async fn load(config: &GraderConfig) -> Result<Self> {
        let python = python_path(config.python())?;
        let mut module = Self {
            config: config.clone(),
            python,
            process: None,
            generation: 0,
            module_name: unique_module_name(),
        };
        module.start().await?;
        tracing::info!(
            "Loaded {} as module {}",
            module.config.submission().display(),
            module.module_name
        );
        Ok(module)
    }

    /// Name the submission was loaded under.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Spawns a host, loads the submission into it and waits for the ready
    /// line.
    async fn start(&mut self) -> Result<()> {
        let submission = self.config.submission();
        let path = std::path::absolute(submission)
            .with_context(|| format!("Could not resolve {}", submission.display()))?;
        let cwd = path.parent().map(|p| p.to_path_buf());

        let args: Vec<OsString> = vec![
            "-u".into(),
            "-c".into(),
            HOST_SCRIPT.into(),
            path.clone().into(),
            self.module_name.clone().into(),
            self.config.class_name().into(),
        ];
        let env: Vec<(OsString, OsString)> = vec![
            ("PYTHONDONTWRITEBYTECODE".into(), "1".into()),
            ("PYTHONIOENCODING".into(), "utf-8".into()),
        ];

        let mut process = LineProcess::spawn(&self.python, &args, cwd.as_deref(), &env)
            .with_context(|| format!("Could not start {}", self.python.display()))?;

        let handshake = |reason: String| LoadError::Handshake {
            path: path.clone(),
            reason,
        };
        let line = match process.read_line(self.config.call_timeout()).await {
            Ok(line) => line,
            Err(e) => {
                process.kill().await;
                return Err(handshake(e.to_string()).into());
            }
        };

        match serde_json::from_str::<Reply>(&line) {
            Ok(Reply::Ready { module }) => {
                tracing::debug!("Host ready with module {}", module);
            }
            Ok(Reply::Raised {
                exception,
                message,
                traceback,
            }) => {
                tracing::debug!("Submission failed to load:\n{}", traceback);
                process.shutdown(SHUTDOWN_GRACE).await;
                return Err(LoadError::Submission {
                    path: path.clone(),
                    exception,
                    message,
                    traceback,
                }
                .into());
            }
            Ok(other) => {
                process.kill().await;
                return Err(handshake(format!("unexpected reply {other:?}")).into());
            }
            Err(e) => {
                process.kill().await;
                return Err(handshake(format!("unreadable reply {line:?}: {e}")).into());
            }
        }

        self.generation += 1;
        self.process = Some(process);
        Ok(())
    }

    /// Sends one request and waits for its reply, restarting the host first
    /// if the previous one was lost.
    async fn exchange(&mut self, request: &Request<'_>) -> Result<Reply, InvocationError> {
        if self.process.is_none() {
            tracing::warn!("Restarting the Python host");
            self.start().await.map_err(|e| InvocationError::HostExited {
                reason: format!("{e:#}"),
            })?;
        }
        let line = serde_json::to_string(request)
            .map_err(|e| InvocationError::Protocol(e.to_string()))?;
        let timeout = self.config.call_timeout();

        let Some(process) = self.process.as_mut() else {
            return Err(InvocationError::HostExited {
                reason: "no host process".into(),
            });
        };
        let result = process.exchange(&line, timeout).await;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                if let Some(process) = self.process.take() {
                    process.kill().await;
                }
                return Err(match e {
                    ExchangeError::TimedOut(timeout) => InvocationError::TimedOut { timeout },
                    other => InvocationError::HostExited {
                        reason: other.to_string(),
                    },
                });
            }
        };

        serde_json::from_str(&reply).map_err(|e| {
            InvocationError::Protocol(format!("unreadable reply {reply:?}: {e}"))
        })
    }

    /// Stops the host.
    pub async fn shutdown(mut self) {
        if let Some(process) = self.process.take() {
            process.shutdown(SHUTDOWN_GRACE).await;
        }
    }
}

/// Turns a reply that should not have been sent into an error.
fn unexpected(reply: Reply) -> InvocationError {
    match reply {
        Reply::Raised {
            exception, message, ..
        } => InvocationError::Raised { exception, message },
        other => InvocationError::Protocol(format!("unexpected reply {other:?}")),
    }
}

impl Analyzer for AnalyzerModule {
    type Instance = InstanceHandle;

    async fn construct(&mut self) -> Result<InstanceHandle, InvocationError> {
        match self.exchange(&Request::Construct).await? {
            Reply::Constructed { instance } => Ok(InstanceHandle {
                generation: self.generation,
                id:         instance,
            }),
            other => Err(unexpected(other)),
        }
    }

    async fn invoke(
        &mut self,
        instance: &InstanceHandle,
        method: Method,
        arg: &Value,
    ) -> Result<Invocation, InvocationError> {
        if instance.generation != self.generation || self.process.is_none() {
            return Err(InvocationError::StaleInstance);
        }
        let request = Request::Invoke {
            instance: instance.id,
            method:   method.name(),
            arg,
        };
        match self.exchange(&request).await? {
            Reply::Returned { value, rendered } => Ok(Invocation { value, rendered }),
            other => Err(unexpected(other)),
        }
    }

    async fn release(&mut self, instance: InstanceHandle) {
        if instance.generation != self.generation || self.process.is_none() {
            return;
        }
        if let Err(e) = self
            .exchange(&Request::Release {
                instance: instance.id,
            })
            .await
        {
            tracing::debug!("Could not release instance {}: {}", instance.id, e);
        }
    }
}
