use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Graft - sync compose projects to a remote host and rebuild them there
#[derive(Parser, Debug)]
#[command(name = "graft")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the project on the host and write starter files
    Init {
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Public domain for the starter manifest
        #[arg(long)]
        domain: Option<String>,

        /// Take over an existing registry entry with the same name
        #[arg(short, long)]
        force: bool,
    },

    /// Transfer sources, upload the manifest and rebuild
    Sync(SyncArgs),

    /// Follow a service's logs on the host
    Logs {
        /// Service name from the manifest
        service: String,
    },

    /// Host-wide maintenance
    #[command(subcommand)]
    Host(HostCommand),

    /// Manage the project's secret store
    #[command(subcommand)]
    Secret(SecretCommand),

    /// List projects initialized on this machine
    Projects,

    /// Run `docker compose <ARGS>` in the remote project directory
    Compose {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: Option<SyncCommand>,

    /// Sync only this service
    pub service: Option<String>,

    /// Purge the build cache and rebuild without it
    #[arg(long)]
    pub no_cache: bool,

    /// Upload sources and manifest, skip build and restart
    #[arg(long)]
    pub upload_only: bool,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Upload only the manifest, then restart without building
    Compose {
        /// Upload the manifest, skip the restart
        #[arg(long)]
        upload_only: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// Prune stopped containers, dangling images, build cache, volumes and networks
    Clean,
}

#[derive(Subcommand, Debug)]
pub enum SecretCommand {
    /// Add a secret; later values for the same key win
    Set { key: String, value: String },
}
