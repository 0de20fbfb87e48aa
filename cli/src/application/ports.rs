//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{BastionConfig, ResourceHandle, Session};

// ── Process Ports ─────────────────────────────────────────────────────────────

/// A supervised background process.
#[allow(async_fn_in_trait)]
pub trait ProcessHandle {
    /// OS process id, if the process is still known to the OS.
    fn id(&self) -> Option<u32>;
    /// Wait for the process to exit.
    async fn wait(&mut self) -> Result<ExitStatus>;
    /// Kill the process and reap it.
    async fn kill(&mut self) -> Result<()>;
}

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Handle type returned by [`CommandRunner::spawn`].
    type Child: ProcessHandle;

    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
    /// Spawn a program without waiting for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn(&self, program: &str, args: &[&str]) -> Result<Self::Child>;
    /// Resolve `program` against `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

// ── Control Plane Ports ───────────────────────────────────────────────────────

/// Cluster-level queries used by the prerequisite checks.
#[allow(async_fn_in_trait)]
pub trait ClusterInspector {
    /// Name of the control-plane client binary, for diagnostics.
    fn tool(&self) -> &str;
    /// Whether the client binary can be found.
    fn tool_available(&self) -> bool;
    /// `cluster-info`.
    async fn cluster_info(&self) -> Result<Output>;
    /// `get namespace <namespace>`.
    async fn get_namespace(&self, namespace: &str) -> Result<Output>;
}

/// Create, await and delete the relay pod.
#[allow(async_fn_in_trait)]
pub trait ResourceLifecycle {
    /// Submit a manifest through stdin.
    async fn apply(&self, manifest: &str) -> Result<Output>;
    /// Block until the pod reports `Ready` or `timeout` elapses.
    async fn wait_ready(&self, handle: &ResourceHandle, timeout: Duration) -> Result<Output>;
    /// Delete the pod with the given grace period.
    async fn delete(&self, handle: &ResourceHandle, grace: Duration) -> Result<Output>;
}

/// Command execution inside the relay pod.
#[allow(async_fn_in_trait)]
pub trait ResourceShell {
    /// Execute `command` inside the pod and capture output.
    async fn exec(&self, handle: &ResourceHandle, command: &[&str]) -> Result<Output>;
}

/// Local port forwarding to the relay pod.
pub trait PortForwarder {
    /// Handle of the background forwarding process.
    type Forward: ProcessHandle;
    /// Start forwarding `local_port` to `remote_port` on the pod.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn port_forward(
        &self,
        handle: &ResourceHandle,
        local_port: u16,
        remote_port: u16,
    ) -> Result<Self::Forward>;
}

/// Read-only queries used for presence checks and failure diagnostics.
#[allow(async_fn_in_trait)]
pub trait ResourceDiagnostics {
    /// `get pod <name>`; success means the pod exists.
    async fn get(&self, handle: &ResourceHandle) -> Result<Output>;
    /// Last `tail` lines of the pod log.
    async fn logs(&self, handle: &ResourceHandle, tail: u32) -> Result<Output>;
    /// `describe pod <name>`.
    async fn describe(&self, handle: &ResourceHandle) -> Result<Output>;
}

/// Composite trait — any type implementing all five sub-traits is a `ControlPlane`.
pub trait ControlPlane:
    ClusterInspector + ResourceLifecycle + ResourceShell + PortForwarder + ResourceDiagnostics
{
}

/// Blanket implementation: any type implementing all five sub-traits is a `ControlPlane`.
impl<T> ControlPlane for T where
    T: ClusterInspector + ResourceLifecycle + ResourceShell + PortForwarder + ResourceDiagnostics
{
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit the bordered error banner for a fatal session error.
    fn failure(&self, message: &str);
    /// Emit a block of diagnostic text under a title.
    fn detail(&self, title: &str, body: &str);
    /// The bridge is up: show the operator how to connect.
    fn established(&self, session: &Session);
}

// ── Config and Host Ports ─────────────────────────────────────────────────────

/// Abstracts loading of `~/.bastion/config.yaml`.
pub trait ConfigStore {
    /// Load and validate the configuration, falling back to defaults when
    /// no file exists.
    fn load(&self) -> Result<BastionConfig>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

/// Abstracts the local "is this port taken" check of the port prompt.
pub trait PortProbe {
    /// Returns `true` if something already listens on `port` locally.
    fn in_use(&self, port: u16) -> bool;
}
