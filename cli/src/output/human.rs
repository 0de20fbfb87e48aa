//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::{EnvironmentTarget, Session};
use crate::domain::resource::ACTIVE_DEADLINE_SECS;
use crate::output::OutputContext;

const RULE: &str = "═══════════════════════════════════════════════════════════════════";

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("bastion v{version}"));
    }

    /// Render the opening banner.
    pub fn render_banner(&self) {
        if self.ctx.quiet {
            return;
        }
        println!();
        println!("  {}", RULE.style(self.ctx.styles.banner));
        println!(
            "  {}",
            "            RDS BASTION · PostgreSQL connector".style(self.ctx.styles.bold)
        );
        println!("  {}", RULE.style(self.ctx.styles.banner));
    }

    /// Render the closing banner after cleanup.
    pub fn render_goodbye(&self) {
        if self.ctx.quiet {
            return;
        }
        println!();
        println!("  {}", RULE.style(self.ctx.styles.dim));
        println!(
            "  {}",
            "              Connection closed · resources cleaned up"
                .style(self.ctx.styles.warning)
        );
        println!("  {}", RULE.style(self.ctx.styles.dim));
    }

    /// One-line label for an environment, as shown in the selection menu.
    #[must_use]
    pub fn environment_label(&self, env: &EnvironmentTarget) -> String {
        format!(
            "{} {}",
            self.environment_name(env),
            format!("(namespace: {})", env.namespace).style(self.ctx.styles.dim)
        )
    }

    /// Confirm the chosen environment.
    pub fn render_environment_selected(&self, env: &EnvironmentTarget) {
        self.ctx
            .success(&format!("environment selected: {}", self.environment_name(env)));
        self.ctx.info(&format!("namespace: {}", env.namespace));
        self.ctx.info(&format!("database host: {}", env.remote_host));
    }

    /// Render the configured environments for `bastion envs`.
    pub fn render_environments(&self, envs: &[EnvironmentTarget], source: Option<&Path>) {
        self.ctx.header("Environments");
        for env in envs {
            println!("  {}", self.environment_name(env));
            self.ctx.kv("  namespace:", &env.namespace);
            self.ctx.kv("  host:", &env.remote_host);
            if let Some(context) = &env.context {
                self.ctx.kv("  context:", context);
            }
            println!();
        }
        match source {
            Some(path) => self.ctx.kv("Config:", &path.display().to_string()),
            None => self.ctx.kv("Config:", "(built-in defaults)"),
        }
    }

    /// Render the connection summary shown before confirmation.
    pub fn render_summary(&self, session: &Session) {
        self.ctx.header("Connection summary");
        self.ctx.kv("Environment:", &self.environment_name(&session.target));
        self.ctx.kv("Namespace:", &session.target.namespace);
        self.ctx.kv("Database:", &session.target.remote_host);
        self.ctx.kv("Local port:", &session.local_port.to_string());
        self.ctx.kv("Pod:", &session.resource.name);
        if let Some(context) = &session.target.context {
            self.ctx.kv("Context:", context);
        }
        if !self.ctx.quiet {
            println!();
        }
    }

    /// Render how to connect once the port-forward is up.
    pub fn render_connection_instructions(&self, session: &Session) {
        if self.ctx.quiet {
            return;
        }
        let port = session.local_port;
        self.ctx.header("Connection established");
        println!("  {}", "GUI clients (DBeaver, pgAdmin):".style(self.ctx.styles.step));
        self.ctx.kv("  Host:", "localhost");
        self.ctx.kv("  Port:", &port.to_string());
        self.ctx.kv("  Database:", "<your database>");
        self.ctx.kv("  Username:", "<your user>");
        println!();
        println!("  {}", "psql:".style(self.ctx.styles.step));
        println!("    psql -h localhost -p {port} -U postgres");
        println!();
        println!(
            "  {}",
            "Any PostgreSQL client can connect to:".style(self.ctx.styles.step)
        );
        println!("    localhost:{port}");
        println!();
        println!("  {}", "Press Ctrl+C to stop.".style(self.ctx.styles.error));
        println!(
            "  {}",
            format!(
                "The relay pod expires after {} minutes.",
                ACTIVE_DEADLINE_SECS / 60
            )
            .style(self.ctx.styles.warning)
        );
        println!();
    }

    /// Render the bordered banner for a fatal session error. Never suppressed.
    pub fn render_error_banner(&self, message: &str) {
        let style = self.ctx.styles.error;
        eprintln!();
        eprintln!(
            "  {}",
            "╔════════════════════════════════════════════════════════════════════╗".style(style)
        );
        eprintln!(
            "  {}",
            "║                                ERROR                               ║".style(style)
        );
        eprintln!(
            "  {}",
            "╚════════════════════════════════════════════════════════════════════╝".style(style)
        );
        eprintln!();
        self.ctx.error(message);
        eprintln!();
    }

    /// Render a titled block of diagnostic output to stderr.
    pub fn render_detail(&self, title: &str, body: &str) {
        eprintln!("  {}", title.style(self.ctx.styles.warning));
        for line in body.lines() {
            eprintln!("    {}", line.style(self.ctx.styles.dim));
        }
        eprintln!();
    }

    fn environment_name(&self, env: &EnvironmentTarget) -> String {
        let style = if env.production {
            self.ctx.styles.production
        } else {
            self.ctx.styles.staging
        };
        env.name.style(style).to_string()
    }
}
