//! `bastion [connect]` — open a bastion session into an environment.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, PortProbe};
use crate::application::services::interrupt;
use crate::application::services::session::run_session;
use crate::domain::{
    BastionConfig, EnvironmentTarget, PortChoice, PortOverride, ResourceHandle, Session, Timings,
    find_environment, parse_port_choice,
};
use crate::infra::kubectl::Kubectl;
use crate::infra::network::TcpPortProbe;
use crate::infra::signals;
use crate::output::human::HumanRenderer;
use crate::output::reporter::TerminalReporter;

/// Arguments for the connect command.
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectArgs {
    /// Environment to connect to (case-insensitive), skips the menu
    #[arg(short, long, value_name = "NAME")]
    pub env: Option<String>,

    /// Local port for the forward (1024-65535, 0 exits), skips the prompt
    #[arg(short, long, value_name = "PORT", value_parser = parse_port_choice)]
    pub port: Option<PortChoice>,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Run the connect command and return the process exit status.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or a prompt fails.
/// Failures after the session starts are reported by the cleanup pass and
/// turned into a non-zero status instead.
pub async fn run(app: &AppContext, args: &ConnectArgs) -> Result<i32> {
    let config = app.config_store.load()?;
    let renderer = HumanRenderer::new(&app.output);
    renderer.render_banner();

    let Some(target) = choose_environment(app, &config, args.env.as_deref())? else {
        app.output.warn("operation cancelled");
        return Ok(0);
    };
    renderer.render_environment_selected(&target);

    let choice = match args.port {
        Some(choice) => choice,
        None => app.prompt_port()?,
    };
    let PortChoice::Port(local_port) = choice else {
        app.output.warn("operation cancelled");
        return Ok(0);
    };
    match port_cleared(app, &TcpPortProbe, local_port)?.exit_code() {
        None => {}
        Some(0) => {
            app.output.warn("operation cancelled");
            return Ok(0);
        }
        Some(code) => {
            app.output.error("operation cancelled");
            return Ok(code);
        }
    }

    let session = build_session(target, local_port, &config, &whoami::username(), Utc::now());
    renderer.render_summary(&session);
    if !app.confirm("Create the connection?", true)? {
        app.output.warn("operation cancelled");
        return Ok(0);
    }

    let (trigger, listener) = interrupt::channel();
    let watcher = signals::spawn_watcher(trigger);

    let cp = Kubectl::default_runner(session.target.context.clone());
    let reporter = TerminalReporter::new(&app.output);
    let report = run_session(&cp, &reporter, &session, listener).await;
    drop(reporter);
    watcher.abort();

    tracing::info!(
        outcome = ?report.outcome,
        resource = ?report.cleanup.resource,
        "session finished"
    );
    if report.exit_code() == 0 {
        renderer.render_goodbye();
    }
    Ok(report.exit_code())
}

/// Pick the target environment from `--env` or the menu.
///
/// Returns `None` when the operator chooses to exit.
///
/// # Errors
///
/// Returns an error for an unknown `--env`, or when no environment was given
/// and prompts are disabled with more than one to choose from.
pub fn choose_environment(
    app: &AppContext,
    config: &BastionConfig,
    requested: Option<&str>,
) -> Result<Option<EnvironmentTarget>> {
    if let Some(name) = requested {
        return Ok(Some(find_environment(&config.environments, name)?.clone()));
    }
    if app.non_interactive && config.environments.len() == 1 {
        return Ok(config.environments.first().cloned());
    }
    let renderer = HumanRenderer::new(&app.output);
    let labels: Vec<String> = config
        .environments
        .iter()
        .map(|env| renderer.environment_label(env))
        .collect();
    let picked = app.select("Select the environment", &labels)?;
    Ok(picked.and_then(|idx| config.environments.get(idx).cloned()))
}

/// Warn when `port` is already taken and let the operator override.
///
/// A free port is always [`PortOverride::Continue`].
///
/// # Errors
///
/// Returns an error if the override prompt fails.
pub fn port_cleared(app: &AppContext, probe: &impl PortProbe, port: u16) -> Result<PortOverride> {
    if !probe.in_use(port) {
        return Ok(PortOverride::Continue);
    }
    app.output.warn(&format!("port {port} is already in use"));
    app.prompt_port_override()
}

/// Assemble the session context once all choices are made.
#[must_use]
pub fn build_session(
    target: EnvironmentTarget,
    local_port: u16,
    config: &BastionConfig,
    identity: &str,
    now: DateTime<Utc>,
) -> Session {
    Session {
        resource: ResourceHandle::generate(identity, &target.namespace, now),
        target,
        local_port,
        relay_image: config.relay.image.clone(),
        timings: Timings::from(&config.timings),
    }
}
