//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Temporary bastion into a private RDS database through the cluster
#[derive(Parser)]
#[command(
    name = "bastion",
    version,
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments for the default `connect` command
    #[command(flatten)]
    pub connect: commands::connect::ConnectArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open a bastion session (default)
    Connect(commands::connect::ConnectArgs),

    /// List configured environments
    Envs(commands::envs::EnvsArgs),

    /// Show version
    Version(commands::version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command and return the process exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before a session starts.
    pub async fn run(self) -> Result<i32> {
        let Cli {
            quiet,
            no_color,
            verbose: _,
            command,
            connect,
        } = self;

        let connect_args = match &command {
            Some(Command::Connect(args)) => args.clone(),
            _ => connect,
        };
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags {
                yes: connect_args.yes,
            },
        });

        match command {
            None | Some(Command::Connect(_)) => commands::connect::run(&app, &connect_args).await,
            Some(Command::Envs(args)) => commands::envs::run(&app, &args).map(|()| 0),
            Some(Command::Version(args)) => commands::version::run(&app, &args).map(|()| 0),
        }
    }
}
