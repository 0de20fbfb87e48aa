//! Connection lifecycle: check → provision → await ready → verify → forward.
//!
//! Each state has one transition function returning the next state or a
//! terminal failure. The states after provisioning carry proof tokens that
//! only the previous transition can mint, so the controller cannot reach
//! `Forwarding` without having passed `Verifying`.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::application::ports::{ControlPlane, ProcessHandle, ProgressReporter};
use crate::application::services::interrupt::{InterruptListener, InterruptReason};
use crate::domain::{
    DATABASE_PORT, ExecError, RELAY_PORT, ResourceHandle, Session, SessionError, SessionState,
    render_manifest,
};

// ── Proof tokens ──────────────────────────────────────────────────────────────

/// The relay pod was accepted by the control plane.
#[derive(Debug)]
pub struct Provisioned(ResourceHandle);

/// The relay pod reported `Ready`.
#[derive(Debug)]
pub struct Ready(ResourceHandle);

/// The relay pod reached the database host.
#[derive(Debug)]
pub struct Verified(ResourceHandle);

macro_rules! token_handle {
    ($($t:ty),*) => {$(
        impl $t {
            /// The pod this token vouches for.
            #[must_use]
            pub fn handle(&self) -> &ResourceHandle {
                &self.0
            }
        }
    )*};
}

token_handle!(Provisioned, Ready, Verified);

// ── States ────────────────────────────────────────────────────────────────────

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The port-forward exited on its own (exit code, if any).
    ForwardingExited(Option<i32>),
    /// A signal asked the session to stop.
    Interrupted(InterruptReason),
}

/// Lifecycle states. Transitions are strictly forward.
#[derive(Debug)]
pub enum Stage {
    Idle,
    Checking,
    Provisioning,
    AwaitingReady(Provisioned),
    Verifying(Ready),
    Forwarding(Verified),
    Closed(CloseReason),
    Failed(SessionError),
}

impl Stage {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Provisioning => "provisioning",
            Self::AwaitingReady(_) => "awaiting-ready",
            Self::Verifying(_) => "verifying",
            Self::Forwarding(_) => "forwarding",
            Self::Closed(_) => "closed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Terminal result of [`LifecycleController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Closed(CloseReason),
    Failed(SessionError),
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Drives one session through its states against a `ControlPlane`.
pub struct LifecycleController<'a, C, R> {
    cp: &'a C,
    reporter: &'a R,
    session: &'a Session,
    interrupts: InterruptListener,
}

impl<'a, C, R> LifecycleController<'a, C, R>
where
    C: ControlPlane,
    R: ProgressReporter,
{
    pub fn new(
        cp: &'a C,
        reporter: &'a R,
        session: &'a Session,
        interrupts: InterruptListener,
    ) -> Self {
        Self {
            cp,
            reporter,
            session,
            interrupts,
        }
    }

    /// Run the session until it closes or fails.
    ///
    /// A raised interrupt is honoured between steps and while forwarding; an
    /// in-flight external call always runs to completion first. On failure
    /// the message is recorded in `state` for the cleanup pass.
    pub async fn run(&mut self, state: &mut SessionState<C::Forward>) -> SessionOutcome {
        let mut stage = Stage::Idle;
        loop {
            if let Some(reason) = self.interrupts.raised() {
                if let Stage::Failed(err) = &stage {
                    tracing::info!(error = %err, "step failed after interrupt");
                }
                if !matches!(stage, Stage::Closed(CloseReason::Interrupted(_))) {
                    tracing::info!(stage = stage.name(), ?reason, "session interrupted");
                }
                return SessionOutcome::Closed(CloseReason::Interrupted(reason));
            }
            stage = match stage {
                Stage::Closed(reason) => return SessionOutcome::Closed(reason),
                Stage::Failed(err) => {
                    tracing::warn!(kind = ?err.kind(), error = %err, "session failed");
                    state.record_error(err.to_string());
                    return SessionOutcome::Failed(err);
                }
                other => {
                    tracing::debug!(stage = other.name(), "entering stage");
                    self.advance(other, state).await
                }
            };
        }
    }

    async fn advance(&mut self, stage: Stage, state: &mut SessionState<C::Forward>) -> Stage {
        match stage {
            Stage::Idle => Stage::Checking,
            Stage::Checking => self.check().await,
            Stage::Provisioning => self.provision(state).await,
            Stage::AwaitingReady(provisioned) => self.await_ready(provisioned).await,
            Stage::Verifying(ready) => self.verify(ready).await,
            Stage::Forwarding(verified) => self.forward(verified, state).await,
            terminal @ (Stage::Closed(_) | Stage::Failed(_)) => terminal,
        }
    }

    async fn check(&self) -> Stage {
        self.reporter.step("checking prerequisites...");
        let tool = self.cp.tool().to_string();

        if !self.cp.tool_available() {
            return Stage::Failed(SessionError::ToolMissing { tool });
        }

        let result = self.cp.cluster_info().await;
        if is_tool_missing(&result) {
            return Stage::Failed(SessionError::ToolMissing { tool });
        }
        if let Err(detail) = command_outcome(result) {
            tracing::debug!(%detail, "cluster-info failed");
            return Stage::Failed(SessionError::ClusterUnreachable);
        }

        let namespace = &self.session.target.namespace;
        if let Err(detail) = command_outcome(self.cp.get_namespace(namespace).await) {
            tracing::debug!(%namespace, %detail, "namespace lookup failed");
            return Stage::Failed(SessionError::NamespaceMissing(namespace.clone()));
        }

        self.reporter.success("prerequisites verified");
        Stage::Provisioning
    }

    async fn provision(&self, state: &mut SessionState<C::Forward>) -> Stage {
        self.reporter.step("creating bastion pod...");
        let handle = &self.session.resource;
        let manifest =
            match render_manifest(handle, &self.session.target, &self.session.relay_image) {
                Ok(m) => m,
                Err(e) => return Stage::Failed(SessionError::ManifestRejected(format!("{e:#}"))),
            };
        tracing::debug!(pod = %handle.name, namespace = %handle.namespace, "applying manifest");

        let result = self.cp.apply(&manifest).await;
        if result.is_err() {
            // The API server may have accepted the pod before the client failed.
            state.mark_unconfirmed(handle.clone());
        }
        match command_outcome(result) {
            Ok(()) => {
                state.mark_provisioned(handle.clone());
                self.reporter.success(&format!("pod created: {}", handle.name));
                Stage::AwaitingReady(Provisioned(handle.clone()))
            }
            Err(detail) => Stage::Failed(SessionError::ManifestRejected(detail)),
        }
    }

    async fn await_ready(&self, provisioned: Provisioned) -> Stage {
        self.reporter.step("waiting for pod to become ready...");
        let timeout = self.session.timings.ready_timeout;
        match command_outcome(self.cp.wait_ready(provisioned.handle(), timeout).await) {
            Ok(()) => {
                self.reporter.success("pod ready");
                Stage::Verifying(Ready(provisioned.0))
            }
            Err(detail) => {
                tracing::debug!(%detail, "readiness wait failed");
                Stage::Failed(SessionError::ReadinessTimeout {
                    secs: timeout.as_secs(),
                })
            }
        }
    }

    async fn verify(&self, ready: Ready) -> Stage {
        self.reporter.step("testing connectivity...");
        tokio::time::sleep(self.session.timings.settle_delay).await;

        let host = self.session.target.remote_host.as_str();
        let port = DATABASE_PORT.to_string();
        let probe = ["nc", "-zv", host, port.as_str()];
        match command_outcome(self.cp.exec(ready.handle(), &probe).await) {
            Ok(()) => {
                self.reporter.success("database reachable from relay");
                Stage::Forwarding(Verified(ready.0))
            }
            Err(detail) => {
                tracing::debug!(%detail, "connectivity probe failed");
                Stage::Failed(SessionError::ConnectivityFailed {
                    host: host.to_string(),
                    port: DATABASE_PORT,
                })
            }
        }
    }

    async fn forward(&mut self, verified: Verified, state: &mut SessionState<C::Forward>) -> Stage {
        let local_port = self.session.local_port;
        self.reporter.step("starting port-forward...");

        let spawned = match self.cp.port_forward(verified.handle(), local_port, RELAY_PORT) {
            Ok(child) => child,
            Err(e) => {
                return Stage::Failed(SessionError::ForwardStart {
                    port: local_port,
                    detail: format!("{e:#}"),
                });
            }
        };
        let child = state.forwarding.insert(spawned);

        let early_exit = tokio::select! {
            biased;
            reason = self.interrupts.wait() => {
                return Stage::Closed(CloseReason::Interrupted(reason));
            }
            status = child.wait() => Some(status),
            () = tokio::time::sleep(self.session.timings.forward_grace) => None,
        };
        if let Some(status) = early_exit {
            state.forwarding = None;
            return Stage::Failed(SessionError::ForwardStart {
                port: local_port,
                detail: describe_exit(&status),
            });
        }

        tracing::info!(pid = ?child.id(), local_port, "port-forward running");
        self.reporter.success("port-forward active");
        self.reporter.established(self.session);

        tokio::select! {
            biased;
            reason = self.interrupts.wait() => Stage::Closed(CloseReason::Interrupted(reason)),
            status = child.wait() => {
                let detail = describe_exit(&status);
                state.forwarding = None;
                tracing::info!(%detail, "port-forward ended");
                self.reporter.warn(&format!("port-forward ended ({detail})"));
                let code = status.ok().and_then(|s| s.code());
                Stage::Closed(CloseReason::ForwardingExited(code))
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Collapse a command result into success or a one-line diagnostic.
fn command_outcome(result: Result<Output>) -> Result<(), String> {
    match result {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                Err(format!("exited with {}", output.status))
            } else {
                Err(stderr)
            }
        }
        Err(e) => Err(format!("{e:#}")),
    }
}

fn is_tool_missing(result: &Result<Output>) -> bool {
    matches!(
        result,
        Err(e) if matches!(e.downcast_ref::<ExecError>(), Some(ExecError::ToolMissing { .. }))
    )
}

fn describe_exit(status: &Result<ExitStatus>) -> String {
    match status {
        Ok(s) => format!("exited with {s}"),
        Err(e) => format!("{e:#}"),
    }
}
