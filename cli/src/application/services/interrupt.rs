//! Interrupt notification between the signal watcher and the main flow.
//!
//! The watcher only raises a flag on a `watch` channel; the main flow owns
//! the session and decides when to hand off to the cleanup pass.

use tokio::sync::watch;

/// Why the session was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

/// Sending half, held by the signal watcher.
#[derive(Debug)]
pub struct InterruptTrigger {
    tx: watch::Sender<Option<InterruptReason>>,
}

impl InterruptTrigger {
    /// Raise the interrupt. Only the first reason is kept.
    pub fn raise(&self, reason: InterruptReason) {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }
}

/// Receiving half, polled by the lifecycle controller.
#[derive(Debug, Clone)]
pub struct InterruptListener {
    rx: watch::Receiver<Option<InterruptReason>>,
}

impl InterruptListener {
    /// The reason, if an interrupt has been raised.
    #[must_use]
    pub fn raised(&self) -> Option<InterruptReason> {
        *self.rx.borrow()
    }

    /// Resolve once an interrupt is raised. Never resolves if the trigger is
    /// dropped without raising.
    pub async fn wait(&mut self) -> InterruptReason {
        let raised = match self.rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        match raised {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}

/// Create a connected trigger/listener pair.
#[must_use]
pub fn channel() -> (InterruptTrigger, InterruptListener) {
    let (tx, rx) = watch::channel(None);
    (InterruptTrigger { tx }, InterruptListener { rx })
}
