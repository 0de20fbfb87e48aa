//! One bastion session from first check to final cleanup.

use crate::application::ports::{ControlPlane, ProgressReporter};
use crate::application::services::cleanup::{CleanupController, CleanupReport, ExitReason};
use crate::application::services::interrupt::InterruptListener;
use crate::application::services::lifecycle::{LifecycleController, SessionOutcome};
use crate::domain::{Session, SessionState};

/// Result of [`run_session`].
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub cleanup: CleanupReport,
}

impl SessionReport {
    /// Process exit status for this session.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.cleanup.exit_code
    }
}

/// Drive the lifecycle, then run the single cleanup pass on whichever exit
/// path the lifecycle took.
pub async fn run_session<C, R>(
    cp: &C,
    reporter: &R,
    session: &Session,
    interrupts: InterruptListener,
) -> SessionReport
where
    C: ControlPlane,
    R: ProgressReporter,
{
    let mut state = SessionState::new();
    tracing::info!(
        env = %session.target.name,
        pod = %session.resource.name,
        local_port = session.local_port,
        "session starting"
    );

    let outcome = LifecycleController::new(cp, reporter, session, interrupts)
        .run(&mut state)
        .await;

    let cleanup = CleanupController::new(cp, reporter, session);
    let report = cleanup.run(&mut state, ExitReason::from(&outcome)).await;

    SessionReport {
        outcome,
        cleanup: report,
    }
}
