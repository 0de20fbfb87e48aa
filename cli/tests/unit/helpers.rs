//! Shared test fakes: a scripted control plane, a fake forwarding process
//! and a recording reporter.

#![allow(dead_code)]

use std::process::{ExitStatus, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use bastion_cli::application::ports::{
    ClusterInspector, PortForwarder, ProcessHandle, ProgressReporter, ResourceDiagnostics,
    ResourceLifecycle, ResourceShell,
};
use bastion_cli::application::services::interrupt::{InterruptReason, InterruptTrigger};
use bastion_cli::domain::environment::builtin_environments;
use bastion_cli::domain::{ExecError, ResourceHandle, Session, Timings};
use chrono::{TimeZone, Utc};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Session fixture ──────────────────────────────────────────────────────────

/// Timings short enough for tests; diagnostics budget kept small so a hung
/// query is cut off quickly.
pub fn fast_timings() -> Timings {
    Timings {
        ready_timeout: Duration::from_secs(60),
        settle_delay: Duration::from_millis(1),
        forward_grace: Duration::from_millis(20),
        diagnostics_budget: Duration::from_millis(50),
        delete_grace: Duration::from_secs(10),
    }
}

/// A STAGING session for user `alice` on local port 15432.
pub fn staging_session() -> Session {
    let target = builtin_environments().remove(0);
    let now = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_default();
    Session {
        resource: ResourceHandle::generate("alice", &target.namespace, now),
        target,
        local_port: 15432,
        relay_image: "alpine/socat".to_string(),
        timings: fast_timings(),
    }
}

// ── Call log ─────────────────────────────────────────────────────────────────

/// Ordered record of everything a fake was asked to do.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().map(|mut v| v.push(call.into())).ok();
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }
}

// ── Fake forwarding process ──────────────────────────────────────────────────

/// How the fake port-forward behaves once spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardBehaviour {
    /// Runs until killed.
    UntilKilled,
    /// Exits by itself after the given delay.
    ExitsAfter(Duration, i32),
}

pub struct FakeProcess {
    behaviour: ForwardBehaviour,
    killed: Arc<AtomicBool>,
    log: CallLog,
}

impl FakeProcess {
    pub fn new(behaviour: ForwardBehaviour, log: CallLog) -> Self {
        Self {
            behaviour,
            killed: Arc::new(AtomicBool::new(false)),
            log,
        }
    }
}

impl ProcessHandle for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        if self.killed.load(Ordering::SeqCst) {
            return Ok(exit_status(137));
        }
        match self.behaviour {
            ForwardBehaviour::UntilKilled => std::future::pending().await,
            ForwardBehaviour::ExitsAfter(delay, code) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(exit_status(code))
            }
        }
    }

    async fn kill(&mut self) -> Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.log.push("kill port-forward");
        Ok(())
    }
}

// ── Fake control plane ───────────────────────────────────────────────────────

/// Where the scripted control plane fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nowhere,
    ToolAbsent,
    ClusterInfo,
    ClusterInfoSpawn,
    Namespace,
    Apply,
    /// The pod is created but the client gives up before reporting it.
    ApplyTimeout,
    WaitReady,
    Connectivity,
    ForwardSpawn,
    ForwardEarlyExit,
}

impl FailAt {
    pub const ALL: [Self; 11] = [
        Self::Nowhere,
        Self::ToolAbsent,
        Self::ClusterInfo,
        Self::ClusterInfoSpawn,
        Self::Namespace,
        Self::Apply,
        Self::ApplyTimeout,
        Self::WaitReady,
        Self::Connectivity,
        Self::ForwardSpawn,
        Self::ForwardEarlyExit,
    ];

    /// Whether the pod exists by the time the failure happens.
    pub fn provisions(self) -> bool {
        matches!(
            self,
            Self::Nowhere
                | Self::ApplyTimeout
                | Self::WaitReady
                | Self::Connectivity
                | Self::ForwardSpawn
                | Self::ForwardEarlyExit
        )
    }
}

/// Scripted `ControlPlane` that records every call.
pub struct FakeControlPlane {
    pub fail_at: FailAt,
    pub forward: ForwardBehaviour,
    pub log: CallLog,
    pod_present: Mutex<bool>,
    /// Presence query errors out instead of answering.
    pub presence_errors: bool,
    /// Delete exits non-zero.
    pub delete_fails: bool,
    /// Log and describe queries never return.
    pub diagnostics_hang: bool,
    interrupt_on: Mutex<Option<(&'static str, InterruptTrigger)>>,
}

impl FakeControlPlane {
    pub fn new(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            forward: ForwardBehaviour::UntilKilled,
            log: CallLog::default(),
            pod_present: Mutex::new(false),
            presence_errors: false,
            delete_fails: false,
            diagnostics_hang: false,
            interrupt_on: Mutex::new(None),
        }
    }

    pub fn with_forward(mut self, forward: ForwardBehaviour) -> Self {
        self.forward = forward;
        self
    }

    /// Raise `trigger` when a call starting with `prefix` is made.
    pub fn interrupt_on(self, prefix: &'static str, trigger: InterruptTrigger) -> Self {
        if let Ok(mut slot) = self.interrupt_on.lock() {
            *slot = Some((prefix, trigger));
        }
        self
    }

    pub fn pod_present(&self) -> bool {
        self.pod_present.lock().map(|p| *p).unwrap_or(false)
    }

    fn set_pod_present(&self, present: bool) {
        if let Ok(mut p) = self.pod_present.lock() {
            *p = present;
        }
    }

    fn record(&self, call: String) {
        if let Ok(slot) = self.interrupt_on.lock()
            && let Some((prefix, trigger)) = slot.as_ref()
            && call.starts_with(prefix)
        {
            trigger.raise(InterruptReason::Interrupt);
        }
        self.log.push(call);
    }

    fn answer(&self, fails: bool, stderr: &[u8]) -> Output {
        if fails {
            err_output(1, stderr)
        } else {
            ok_output(b"")
        }
    }
}

impl ClusterInspector for FakeControlPlane {
    fn tool(&self) -> &str {
        "kubectl"
    }

    fn tool_available(&self) -> bool {
        self.fail_at != FailAt::ToolAbsent
    }

    async fn cluster_info(&self) -> Result<Output> {
        self.record("cluster-info".to_string());
        if self.fail_at == FailAt::ClusterInfoSpawn {
            return Err(anyhow::Error::new(ExecError::ToolMissing {
                program: "kubectl".to_string(),
            })
            .context("kubectl cluster-info"));
        }
        Ok(self.answer(
            self.fail_at == FailAt::ClusterInfo,
            b"Unable to connect to the server",
        ))
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Output> {
        self.record(format!("get namespace {namespace}"));
        Ok(self.answer(
            self.fail_at == FailAt::Namespace,
            b"namespaces not found",
        ))
    }
}

impl ResourceLifecycle for FakeControlPlane {
    async fn apply(&self, manifest: &str) -> Result<Output> {
        self.record("apply".to_string());
        if self.fail_at == FailAt::Apply {
            return Ok(err_output(1, b"pods is forbidden"));
        }
        assert!(manifest.contains("kind: Pod"), "manifest: {manifest}");
        self.set_pod_present(true);
        if self.fail_at == FailAt::ApplyTimeout {
            return Err(ExecError::Timeout {
                program: "kubectl".to_string(),
                secs: 30,
            }
            .into());
        }
        Ok(ok_output(b"pod/created"))
    }

    async fn wait_ready(&self, handle: &ResourceHandle, timeout: Duration) -> Result<Output> {
        self.record(format!("wait {} {}s", handle.pod_ref(), timeout.as_secs()));
        Ok(self.answer(self.fail_at == FailAt::WaitReady, b"timed out waiting"))
    }

    async fn delete(&self, handle: &ResourceHandle, grace: Duration) -> Result<Output> {
        self.record(format!("delete {} grace={}", handle.name, grace.as_secs()));
        if self.delete_fails {
            return Ok(err_output(1, b"forbidden"));
        }
        self.set_pod_present(false);
        Ok(ok_output(b""))
    }
}

impl ResourceShell for FakeControlPlane {
    async fn exec(&self, handle: &ResourceHandle, command: &[&str]) -> Result<Output> {
        self.record(format!("exec {} {}", handle.name, command.join(" ")));
        Ok(self.answer(
            self.fail_at == FailAt::Connectivity,
            b"Connection timed out",
        ))
    }
}

impl PortForwarder for FakeControlPlane {
    type Forward = FakeProcess;

    fn port_forward(
        &self,
        handle: &ResourceHandle,
        local_port: u16,
        remote_port: u16,
    ) -> Result<FakeProcess> {
        self.record(format!(
            "port-forward {} {local_port}:{remote_port}",
            handle.pod_ref()
        ));
        match self.fail_at {
            FailAt::ForwardSpawn => anyhow::bail!("failed to spawn kubectl"),
            FailAt::ForwardEarlyExit => Ok(FakeProcess::new(
                ForwardBehaviour::ExitsAfter(Duration::ZERO, 1),
                self.log.clone(),
            )),
            _ => Ok(FakeProcess::new(self.forward, self.log.clone())),
        }
    }
}

impl ResourceDiagnostics for FakeControlPlane {
    async fn get(&self, handle: &ResourceHandle) -> Result<Output> {
        self.record(format!("get pod {}", handle.name));
        if self.presence_errors {
            anyhow::bail!("kubectl get: connection reset");
        }
        Ok(self.answer(!self.pod_present(), b"pods not found"))
    }

    async fn logs(&self, handle: &ResourceHandle, tail: u32) -> Result<Output> {
        self.record(format!("logs {} --tail={tail}", handle.name));
        if self.diagnostics_hang {
            std::future::pending::<()>().await;
        }
        Ok(ok_output(b"socat started"))
    }

    async fn describe(&self, handle: &ResourceHandle) -> Result<Output> {
        self.record(format!("describe {}", handle.name));
        if self.diagnostics_hang {
            std::future::pending::<()>().await;
        }
        Ok(ok_output(b"Status: Running"))
    }
}

// ── Recording reporter ───────────────────────────────────────────────────────

/// `ProgressReporter` that records events instead of printing.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
    raise_on_established: Mutex<Option<InterruptTrigger>>,
}

impl RecordingReporter {
    /// Simulate the operator pressing Ctrl-C once connection instructions show.
    pub fn interrupt_when_established(trigger: InterruptTrigger) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            raise_on_established: Mutex::new(Some(trigger)),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn push(&self, event: String) {
        if let Ok(mut e) = self.events.lock() {
            e.push(event);
        }
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push(format!("step: {message}"));
    }

    fn success(&self, message: &str) {
        self.push(format!("success: {message}"));
    }

    fn warn(&self, message: &str) {
        self.push(format!("warn: {message}"));
    }

    fn failure(&self, message: &str) {
        self.push(format!("failure: {message}"));
    }

    fn detail(&self, title: &str, body: &str) {
        self.push(format!("detail: {title} {body}"));
    }

    fn established(&self, session: &Session) {
        self.push(format!("established: localhost:{}", session.local_port));
        if let Ok(slot) = self.raise_on_established.lock()
            && let Some(trigger) = slot.as_ref()
        {
            trigger.raise(InterruptReason::Interrupt);
        }
    }
}
