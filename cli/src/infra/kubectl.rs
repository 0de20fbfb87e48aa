//! Infrastructure implementation of the control-plane port traits.
//!
//! `Kubectl<R>` routes every cluster call through a `CommandRunner`, so
//! tests can inject a recording runner without a cluster.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    ClusterInspector, CommandRunner, PortForwarder, ResourceDiagnostics, ResourceLifecycle,
    ResourceShell,
};
use crate::domain::ResourceHandle;
use crate::infra::command_runner::TokioCommandRunner;

/// Client binary driven by [`Kubectl`].
pub const KUBECTL: &str = "kubectl";

/// Extra runner time on top of `kubectl wait --timeout`, so kubectl reports
/// the timeout itself before the runner kills it.
const WAIT_SLACK: Duration = Duration::from_secs(10);

/// Control-plane adapter backed by the `kubectl` CLI.
pub struct Kubectl<R: CommandRunner> {
    runner: R,
    context: Option<String>,
}

impl<R: CommandRunner> Kubectl<R> {
    /// Create an adapter. `context` selects a kubeconfig context; `None`
    /// uses the current one.
    pub fn new(runner: R, context: Option<String>) -> Self {
        Self { runner, context }
    }

    /// Prefix `rest` with the global flags of this adapter.
    fn args<'a>(&'a self, rest: &[&'a str]) -> Vec<&'a str> {
        let mut args = Vec::with_capacity(rest.len() + 2);
        if let Some(context) = &self.context {
            args.push("--context");
            args.push(context.as_str());
        }
        args.extend_from_slice(rest);
        args
    }

    async fn kubectl(&self, rest: &[&str]) -> Result<Output> {
        let args = self.args(rest);
        self.runner
            .run(KUBECTL, &args)
            .await
            .with_context(|| format!("kubectl {}", rest.first().copied().unwrap_or_default()))
    }
}

impl Kubectl<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(context: Option<String>) -> Self {
        Self::new(TokioCommandRunner::default(), context)
    }
}

impl<R: CommandRunner> ClusterInspector for Kubectl<R> {
    fn tool(&self) -> &str {
        KUBECTL
    }

    fn tool_available(&self) -> bool {
        self.runner.locate(KUBECTL).is_some()
    }

    async fn cluster_info(&self) -> Result<Output> {
        self.kubectl(&["cluster-info"]).await
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Output> {
        self.kubectl(&["get", "namespace", namespace]).await
    }
}

impl<R: CommandRunner> ResourceLifecycle for Kubectl<R> {
    async fn apply(&self, manifest: &str) -> Result<Output> {
        let args = self.args(&["apply", "-f", "-"]);
        self.runner
            .run_with_stdin(KUBECTL, &args, manifest.as_bytes())
            .await
            .context("kubectl apply")
    }

    async fn wait_ready(&self, handle: &ResourceHandle, timeout: Duration) -> Result<Output> {
        let pod = handle.pod_ref();
        let timeout_flag = format!("--timeout={}s", timeout.as_secs());
        let args = self.args(&[
            "wait",
            "--for=condition=Ready",
            pod.as_str(),
            "-n",
            handle.namespace.as_str(),
            timeout_flag.as_str(),
        ]);
        self.runner
            .run_with_timeout(KUBECTL, &args, timeout + WAIT_SLACK)
            .await
            .context("kubectl wait")
    }

    async fn delete(&self, handle: &ResourceHandle, grace: Duration) -> Result<Output> {
        let grace_flag = format!("--grace-period={}", grace.as_secs());
        self.kubectl(&[
            "delete",
            "pod",
            handle.name.as_str(),
            "-n",
            handle.namespace.as_str(),
            grace_flag.as_str(),
        ])
        .await
    }
}

impl<R: CommandRunner> ResourceShell for Kubectl<R> {
    async fn exec(&self, handle: &ResourceHandle, command: &[&str]) -> Result<Output> {
        let mut rest = vec![
            "exec",
            handle.name.as_str(),
            "-n",
            handle.namespace.as_str(),
            "--",
        ];
        rest.extend_from_slice(command);
        self.kubectl(&rest).await
    }
}

impl<R: CommandRunner> PortForwarder for Kubectl<R> {
    type Forward = R::Child;

    fn port_forward(
        &self,
        handle: &ResourceHandle,
        local_port: u16,
        remote_port: u16,
    ) -> Result<Self::Forward> {
        let pod = handle.pod_ref();
        let mapping = format!("{local_port}:{remote_port}");
        let args = self.args(&[
            "port-forward",
            pod.as_str(),
            mapping.as_str(),
            "-n",
            handle.namespace.as_str(),
        ]);
        self.runner
            .spawn(KUBECTL, &args)
            .context("kubectl port-forward")
    }
}

impl<R: CommandRunner> ResourceDiagnostics for Kubectl<R> {
    async fn get(&self, handle: &ResourceHandle) -> Result<Output> {
        self.kubectl(&[
            "get",
            "pod",
            handle.name.as_str(),
            "-n",
            handle.namespace.as_str(),
        ])
        .await
    }

    async fn logs(&self, handle: &ResourceHandle, tail: u32) -> Result<Output> {
        let tail_flag = format!("--tail={tail}");
        self.kubectl(&[
            "logs",
            handle.name.as_str(),
            "-n",
            handle.namespace.as_str(),
            tail_flag.as_str(),
        ])
        .await
    }

    async fn describe(&self, handle: &ResourceHandle) -> Result<Output> {
        self.kubectl(&[
            "describe",
            "pod",
            handle.name.as_str(),
            "-n",
            handle.namespace.as_str(),
        ])
        .await
    }
}
