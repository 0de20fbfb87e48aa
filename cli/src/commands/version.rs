//! Version command

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Arguments for the version command.
#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext, args: &VersionArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if args.json {
        println!("{}", json::format_version(version)?);
    } else {
        HumanRenderer::new(&app.output).render_version(version);
    }
    Ok(())
}
