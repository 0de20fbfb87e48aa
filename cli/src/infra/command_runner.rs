//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

use crate::application::ports::{CommandRunner, ProcessHandle};
use crate::domain::ExecError;

/// Default timeout for one-shot kubectl calls (cluster-info, get, apply, ...).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Production `CommandRunner`.
///
/// On Windows, `tokio::time::timeout` around `.output().await` does NOT kill
/// the child process when the timeout fires. This implementation uses
/// `tokio::select!` with explicit `child.kill()` to guarantee the process is
/// terminated.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    type Child = Child;

    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "run");
        let child = start(
            Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped()),
            program,
        )?;
        collect(child, program, timeout).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        tracing::debug!(program, ?args, bytes = input.len(), "run with stdin");
        let mut child = start(
            Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped()),
            program,
        )?;

        if let Some(mut stdin) = child.stdin.take() {
            let input_owned = input.to_vec();
            // Writer runs alongside the readers so a large manifest cannot
            // deadlock against a full stdout pipe. Dropping `stdin` closes it.
            tokio::spawn(async move {
                let _ = stdin.write_all(&input_owned).await;
            });
        }

        collect(child, program, self.timeout).await
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<Child> {
        tracing::debug!(program, ?args, "spawn");
        start(
            Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
            program,
        )
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

impl ProcessHandle for Child {
    fn id(&self) -> Option<u32> {
        Child::id(self)
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        Child::wait(self).await.context("waiting for child process")
    }

    async fn kill(&mut self) -> Result<()> {
        Child::kill(self).await.context("killing child process")
    }
}

/// Spawn with `kill_on_drop`, mapping "not found" to [`ExecError::ToolMissing`].
fn start(command: &mut Command, program: &str) -> Result<Child> {
    match command.kill_on_drop(true).spawn() {
        Ok(child) => Ok(child),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ExecError::ToolMissing {
            program: program.to_string(),
        }
        .into()),
        Err(e) => Err(e).with_context(|| format!("failed to spawn {program}")),
    }
}

/// Wait for `child` while draining its pipes; kill it if `timeout` elapses.
async fn collect(mut child: Child, program: &str, timeout: Duration) -> Result<Output> {
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
            );
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            Err(ExecError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs(),
            }
            .into())
        }
    }
}
