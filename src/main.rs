//! Graft CLI - compose project sync and remote rebuild
//!
//! Usage: graft <COMMAND>
//!
//! Commands:
//!   init      Register the project on the host and write starter files
//!   sync      Transfer sources, upload the manifest and rebuild
//!   logs      Follow a service's logs on the host
//!   host      Host-wide maintenance
//!   secret    Manage the project's secret store
//!   projects  List projects initialized on this machine
//!   compose   Run docker compose in the remote project directory

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, HostCommand, SecretCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let project_root = commands::project_root(cli.dir.as_deref())?;

    match cli.command {
        Commands::Init {
            name,
            domain,
            force,
        } => commands::init::cmd_init(&project_root, name, domain, force),
        Commands::Sync(args) => commands::sync::cmd_sync(&project_root, args),
        Commands::Logs { service } => commands::remote::cmd_logs(&project_root, &service),
        Commands::Host(HostCommand::Clean) => commands::remote::cmd_host_clean(&project_root),
        Commands::Secret(SecretCommand::Set { key, value }) => {
            commands::secret::cmd_secret_set(&project_root, &key, &value)
        }
        Commands::Projects => commands::projects::cmd_projects(),
        Commands::Compose { args } => commands::remote::cmd_compose(&project_root, &args),
    }
}
