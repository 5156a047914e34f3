use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ims-release",
    about = "IMS Release — scanlation project, release and archive server",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Write a default configuration file
    InitConfig(InitConfigArgs),
    /// Load and validate a configuration file
    CheckConfig(ConfigArg),
    /// Delete a project with all of its releases, pages and images
    PurgeProject(PurgeProjectArgs),
}

#[derive(Args)]
pub struct ConfigArg {
    /// Path to the TOML configuration; defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct InitConfigArgs {
    #[arg(default_value = "ims-release.toml")]
    pub path: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct PurgeProjectArgs {
    #[command(flatten)]
    pub config: ConfigArg,
    pub project_id: u32,
}
