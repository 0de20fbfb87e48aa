//! `bastion envs` — list configured environments.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Arguments for the envs command.
#[derive(Args, Debug, Default)]
pub struct EnvsArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the envs command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(app: &AppContext, args: &EnvsArgs) -> Result<()> {
    let config = app.config_store.load()?;
    let path = app.config_store.path()?;
    let source = path.exists().then_some(path.as_path());

    if args.json {
        println!("{}", json::format_environments(&config.environments, source)?);
    } else {
        HumanRenderer::new(&app.output).render_environments(&config.environments, source);
    }
    Ok(())
}
