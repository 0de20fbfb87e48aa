//! Cleanup pass: release whatever the session provisioned, exactly once.
//!
//! Every step is best-effort. A failing step is logged and reported, and the
//! next step still runs. Diagnostic queries are bounded by the session's
//! diagnostics budget so a vanished pod cannot stall the pass.

use std::future::Future;
use std::process::Output;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::application::ports::{ControlPlane, ProcessHandle, ProgressReporter};
use crate::application::services::lifecycle::SessionOutcome;
use crate::domain::{ResourceHandle, Session, SessionState};

/// Lines of pod log shown with a failure.
const LOG_TAIL: u32 = 10;

/// Which exit path triggered the cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The port-forward ended on its own.
    Completed,
    /// A lifecycle step failed.
    Failed,
    /// A signal asked the session to stop.
    Interrupted,
}

impl ExitReason {
    /// Process exit status after cleanup.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed | Self::Interrupted => 0,
            Self::Failed => 1,
        }
    }
}

impl From<&SessionOutcome> for ExitReason {
    fn from(outcome: &SessionOutcome) -> Self {
        use crate::application::services::lifecycle::CloseReason;
        match outcome {
            SessionOutcome::Failed(_) => Self::Failed,
            SessionOutcome::Closed(CloseReason::Interrupted(_)) => Self::Interrupted,
            SessionOutcome::Closed(CloseReason::ForwardingExited(_)) => Self::Completed,
        }
    }
}

/// What happened to the relay pod during teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceTeardown {
    /// Nothing was provisioned.
    NotProvisioned,
    /// Presence query reported the pod already gone.
    AlreadyGone,
    /// Delete succeeded.
    Deleted,
    /// Delete was attempted and failed.
    DeleteFailed,
}

/// Summary of one cleanup invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// `false` when the latch was already set and nothing ran.
    pub performed: bool,
    /// Pod logs/status were shown with the error banner.
    pub diagnostics_shown: bool,
    /// A port-forward process was killed.
    pub forwarding_stopped: bool,
    pub resource: ResourceTeardown,
    pub exit_code: i32,
}

/// Single-shot teardown of a session.
pub struct CleanupController<'a, C, R> {
    cp: &'a C,
    reporter: &'a R,
    session: &'a Session,
    done: AtomicBool,
}

impl<'a, C, R> CleanupController<'a, C, R>
where
    C: ControlPlane,
    R: ProgressReporter,
{
    pub fn new(cp: &'a C, reporter: &'a R, session: &'a Session) -> Self {
        Self {
            cp,
            reporter,
            session,
            done: AtomicBool::new(false),
        }
    }

    /// Whether a cleanup pass has started.
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Tear down the session. Only the first call does anything.
    ///
    /// The latch is set before any teardown action, so a racing second call
    /// returns immediately with `performed == false`.
    pub async fn run(
        &self,
        state: &mut SessionState<C::Forward>,
        reason: ExitReason,
    ) -> CleanupReport {
        let mut report = CleanupReport {
            performed: false,
            diagnostics_shown: false,
            forwarding_stopped: false,
            resource: ResourceTeardown::NotProvisioned,
            exit_code: reason.exit_code(),
        };
        if self.done.swap(true, Ordering::AcqRel) {
            tracing::debug!(?reason, "cleanup already ran");
            return report;
        }
        report.performed = true;
        tracing::info!(?reason, "cleanup started");

        if reason == ExitReason::Failed
            && let Some(err) = state.last_error.take()
        {
            self.reporter.failure(&err.message);
            report.diagnostics_shown = self.diagnose(err.resource.as_ref()).await;
        }

        self.reporter.step("cleaning up resources...");

        if let Some(mut child) = state.forwarding.take() {
            match child.kill().await {
                Ok(()) => {
                    report.forwarding_stopped = true;
                    self.reporter.success("port-forward stopped");
                }
                Err(e) => {
                    tracing::debug!(error = %format!("{e:#}"), "killing port-forward failed");
                    self.reporter.warn("port-forward could not be stopped");
                }
            }
        }

        if state.resource_provisioned
            && let Some(handle) = state.resource.clone()
        {
            report.resource = self.remove_resource(&handle).await;
            if matches!(
                report.resource,
                ResourceTeardown::Deleted | ResourceTeardown::AlreadyGone
            ) {
                state.resource_provisioned = false;
            }
        }

        tracing::info!(resource = ?report.resource, "cleanup finished");
        report
    }

    /// Show logs and status of the pod, if it still exists.
    async fn diagnose(&self, resource: Option<&ResourceHandle>) -> bool {
        let Some(handle) = resource else {
            return false;
        };
        if self.presence(handle).await != Some(true) {
            return false;
        }
        if let Some(output) = self.bounded("logs", self.cp.logs(handle, LOG_TAIL)).await {
            self.reporter.detail("Pod logs:", String::from_utf8_lossy(&output.stdout).trim_end());
        }
        if let Some(output) = self.bounded("describe", self.cp.describe(handle)).await {
            self.reporter.detail("Pod status:", String::from_utf8_lossy(&output.stdout).trim_end());
        }
        true
    }

    async fn remove_resource(&self, handle: &ResourceHandle) -> ResourceTeardown {
        if self.presence(handle).await == Some(false) {
            tracing::info!(pod = %handle.name, "pod already gone");
            return ResourceTeardown::AlreadyGone;
        }

        self.reporter.step(&format!("removing pod {}...", handle.name));
        let result = self.cp.delete(handle, self.session.timings.delete_grace).await;
        match result {
            Ok(output) if output.status.success() => {
                self.reporter.success("pod removed");
                ResourceTeardown::Deleted
            }
            Ok(output) => {
                tracing::debug!(stderr = %String::from_utf8_lossy(&output.stderr), "delete failed");
                self.warn_leak(handle);
                ResourceTeardown::DeleteFailed
            }
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "delete failed");
                self.warn_leak(handle);
                ResourceTeardown::DeleteFailed
            }
        }
    }

    fn warn_leak(&self, handle: &ResourceHandle) {
        self.reporter.warn(&format!(
            "could not remove pod {name}; delete it with: {tool} delete pod {name} -n {ns}",
            name = handle.name,
            tool = self.cp.tool(),
            ns = handle.namespace,
        ));
    }

    /// `Some(true)` if the pod exists, `Some(false)` if the query says it does
    /// not, `None` if the query itself failed or ran out of budget.
    async fn presence(&self, handle: &ResourceHandle) -> Option<bool> {
        self.bounded_raw("get", self.cp.get(handle))
            .await
            .map(|output| output.status.success())
    }

    /// Run a diagnostic query within budget, keeping only successful output.
    async fn bounded<F>(&self, what: &str, query: F) -> Option<Output>
    where
        F: Future<Output = Result<Output>>,
    {
        self.bounded_raw(what, query)
            .await
            .filter(|output| output.status.success())
    }

    async fn bounded_raw<F>(&self, what: &str, query: F) -> Option<Output>
    where
        F: Future<Output = Result<Output>>,
    {
        let budget = self.session.timings.diagnostics_budget;
        match tokio::time::timeout(budget, query).await {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                tracing::debug!(
                    query = what,
                    error = %format!("{e:#}"),
                    "diagnostic query failed"
                );
                None
            }
            Err(_) => {
                tracing::debug!(
                    query = what,
                    budget_secs = budget.as_secs(),
                    "diagnostic query timed out"
                );
                None
            }
        }
    }
}
