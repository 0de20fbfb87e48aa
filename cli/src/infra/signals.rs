//! OS signal watcher feeding the interrupt channel.

use tokio::task::JoinHandle;

use crate::application::services::interrupt::{InterruptReason, InterruptTrigger};

/// Spawn a task that raises `trigger` on the first SIGINT or SIGTERM.
///
/// The task only raises the flag; the main flow decides when to clean up.
pub fn spawn_watcher(trigger: InterruptTrigger) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reason = wait_for_signal().await;
        tracing::info!(?reason, "signal received");
        trigger.raise(reason);
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> InterruptReason {
    use tokio::signal::unix::{SignalKind, signal};

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = interrupt => InterruptReason::Interrupt,
        () = terminate => InterruptReason::Terminate,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> InterruptReason {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    InterruptReason::Interrupt
}
