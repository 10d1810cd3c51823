#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! A long-lived child process that speaks one line per request and reply.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
    time::Duration,
};

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    process::{Child, ChildStdin, ChildStdout, Command},
    time::timeout,
};

/// Drop guard that terminates a spawned child process if callers forget to
/// shut it down.
struct ChildDropGuard(Option<Child>);

impl ChildDropGuard {
    /// Wraps the provided child process with the drop guard.
    fn new(child: Child) -> Self {
        Self(Some(child))
    }

    /// Returns a mutable reference to the underlying child process.
    fn child_mut(&mut self) -> Result<&mut Child> {
        self.0
            .as_mut()
            .context("child process already taken from guard")
    }

    /// Takes the child out of the guard so it is no longer killed on drop.
    fn disarm(&mut self) -> Option<Child> {
        self.0.take()
    }
}

impl Drop for ChildDropGuard {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Why a request/reply exchange with the child did not complete.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// No reply line arrived within the deadline.
    #[error("no reply within {0:?}")]
    TimedOut(Duration),
    /// The child closed its stdout, usually because it exited.
    #[error("process closed its output")]
    Closed,
    /// Reading or writing a pipe failed.
    #[error("pipe error: {0}")]
    Io(#[from] std::io::Error),
}

/// A spawned child with piped stdin/stdout and inherited stderr.
pub struct LineProcess {
    /// Kills the child if this value is dropped without `shutdown`.
    guard:  ChildDropGuard,
    /// Request pipe.
    stdin:  ChildStdin,
    /// Reply pipe.
    stdout: BufReader<ChildStdout>,
}

impl std::fmt::Debug for LineProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineProcess")
            .field("pid", &self.guard.0.as_ref().and_then(Child::id))
            .finish()
    }
}

impl LineProcess {
    /// Spawns `program` with `args`, optionally in `cwd` and with extra
    /// environment variables.
    pub fn spawn(
        program: impl AsRef<OsStr>,
        args: &[OsString],
        cwd: Option<&Path>,
        env: &[(OsString, OsString)],
    ) -> Result<Self> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }

        let mut guard = ChildDropGuard::new(cmd.spawn().context("failed to spawn process")?);
        let stdin = guard
            .child_mut()?
            .stdin
            .take()
            .context("missing stdin pipe")?;
        let stdout = guard
            .child_mut()?
            .stdout
            .take()
            .context("missing stdout pipe")?;

        Ok(Self {
            guard,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Writes one line, appending the newline.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ExchangeError> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Reads one line, without its newline, waiting at most `deadline`.
    pub async fn read_line(&mut self, deadline: Duration) -> Result<String, ExchangeError> {
        let mut line = String::new();
        let read = timeout(deadline, self.stdout.read_line(&mut line))
            .await
            .map_err(|_| ExchangeError::TimedOut(deadline))??;
        if read == 0 {
            return Err(ExchangeError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Sends a line and waits for the reply line.
    pub async fn exchange(&mut self, line: &str, deadline: Duration) -> Result<String, ExchangeError> {
        self.send_line(line).await?;
        self.read_line(deadline).await
    }

    /// Closes stdin and gives the child `grace` to exit before killing it.
    pub async fn shutdown(mut self, grace: Duration) {
        let _ = self.stdin.shutdown().await;
        drop(self.stdin);
        if let Some(mut child) = self.guard.disarm()
            && timeout(grace, child.wait()).await.is_err()
        {
            tracing::debug!("Child did not exit within {:?}, killing it", grace);
            let _ = child.kill().await;
        }
    }

    /// Kills the child immediately.
    pub async fn kill(mut self) {
        if let Some(mut child) = self.guard.disarm() {
            let _ = child.kill().await;
        }
    }
}
