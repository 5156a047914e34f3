use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

const DEFAULT_FILTER: &str = "ims_server=info,tower_http=info";

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let default_filter = if cli.verbose {
        "ims_server=debug,ims_release=debug,ims_db=debug,ims_store=debug,tower_http=debug"
    } else {
        DEFAULT_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
    commands::run_command(cli)
}
