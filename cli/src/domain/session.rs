//! Session context and the mutable record of what a session provisioned.

use crate::domain::config::Timings;
use crate::domain::environment::EnvironmentTarget;
use crate::domain::resource::ResourceHandle;

/// Everything one bridge session needs, decided before provisioning starts.
///
/// Built once by the connect command and borrowed by the lifecycle and
/// cleanup controllers.
#[derive(Debug, Clone)]
pub struct Session {
    pub target: EnvironmentTarget,
    pub local_port: u16,
    pub resource: ResourceHandle,
    pub relay_image: String,
    pub timings: Timings,
}

/// A step failure waiting to be reported by the cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub message: String,
    /// The relay pod, when the failure happened after it was created.
    pub resource: Option<ResourceHandle>,
}

/// What has been provisioned so far. Source of truth for cleanup.
///
/// Populated monotonically by the lifecycle controller and consumed by the
/// single cleanup pass. Generic over the forwarding process handle so the
/// domain stays free of process types.
#[derive(Debug)]
pub struct SessionState<P> {
    /// `true` once `kubectl apply` succeeded or may have succeeded; cleared
    /// when the pod is gone.
    pub resource_provisioned: bool,
    /// Handle recorded at provisioning time.
    pub resource: Option<ResourceHandle>,
    /// Running `kubectl port-forward`, if started.
    pub forwarding: Option<P>,
    /// Failure awaiting diagnostics.
    pub last_error: Option<LastError>,
}

impl<P> SessionState<P> {
    /// Empty state at session start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resource_provisioned: false,
            resource: None,
            forwarding: None,
            last_error: None,
        }
    }

    /// Record a successful resource creation.
    pub fn mark_provisioned(&mut self, handle: ResourceHandle) {
        self.resource = Some(handle);
        self.resource_provisioned = true;
    }

    /// Record a creation whose outcome is unknown. The pod may exist, so
    /// cleanup must query for it and delete it if found.
    pub fn mark_unconfirmed(&mut self, handle: ResourceHandle) {
        self.mark_provisioned(handle);
    }

    /// Record a step failure together with the resource it left behind.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(LastError {
            message: message.into(),
            resource: self
                .resource
                .clone()
                .filter(|_| self.resource_provisioned),
        });
    }

    /// Whether a port-forward process is held.
    #[must_use]
    pub fn forwarding_active(&self) -> bool {
        self.forwarding.is_some()
    }
}

impl<P> Default for SessionState<P> {
    fn default() -> Self {
        Self::new()
    }
}
