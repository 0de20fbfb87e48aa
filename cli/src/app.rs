//! Application context — unified state passed to every command handler.
//!
//! All interactive prompts go through `AppContext` so the non-interactive
//! switches (`--yes`, `CI`, `BASTION_YES`) apply uniformly.

use anyhow::{Context, Result};

use crate::domain::{PortChoice, PortOverride, parse_port_choice, parse_port_override};
use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `BASTION_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Config file access.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `BASTION_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("BASTION_YES").is_ok();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_store: YamlConfigStore::default(),
            non_interactive: flags.behaviour.yes || ci_env,
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `default` immediately
    /// without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("confirmation prompt")
    }

    /// Let the user pick one of `items`. The last entry is an "Exit" option;
    /// choosing it returns `None`.
    ///
    /// # Errors
    ///
    /// Returns an error in non-interactive mode or if the prompt fails.
    pub fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        if self.non_interactive {
            anyhow::bail!("{prompt}: no choice given and prompts are disabled");
        }
        let mut entries: Vec<&str> = items.iter().map(String::as_str).collect();
        entries.push("Exit");
        let idx = dialoguer::Select::new()
            .with_prompt(prompt)
            .items(&entries)
            .default(0)
            .interact()
            .context("selection prompt")?;
        Ok((idx < items.len()).then_some(idx))
    }

    /// Ask for a local port, re-prompting until the answer parses.
    ///
    /// Empty input selects the default port, `0` exits. In non-interactive
    /// mode the default port is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn prompt_port(&self) -> Result<PortChoice> {
        if self.non_interactive {
            return Ok(parse_port_choice("")?);
        }
        let answer: String = dialoguer::Input::new()
            .with_prompt("Local port [5432] or 0 to exit")
            .allow_empty(true)
            .validate_with(|input: &String| parse_port_choice(input).map(|_| ()))
            .interact_text()
            .context("port prompt")?;
        Ok(parse_port_choice(&answer)?)
    }

    /// Ask whether to use a port that is already taken.
    ///
    /// `y` continues, `0` exits, anything else cancels. In non-interactive
    /// mode the port is used anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn prompt_port_override(&self) -> Result<PortOverride> {
        if self.non_interactive {
            return Ok(PortOverride::Continue);
        }
        let answer: String = dialoguer::Input::new()
            .with_prompt("Continue anyway? [y/N/0 to exit]")
            .allow_empty(true)
            .interact_text()
            .context("port override prompt")?;
        Ok(parse_port_override(&answer))
    }
}
