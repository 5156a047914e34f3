use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use ims_server::{open_catalog, ImsServer, ServerConfig};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::InitConfig(args) => cmd_init_config(args),
        Command::CheckConfig(args) => cmd_check_config(args, &cli.format),
        Command::PurgeProject(args) => cmd_purge_project(args, &cli.format),
    }
}

fn load_config(arg: &ConfigArg) -> anyhow::Result<ServerConfig> {
    match &arg.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            ServerConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))
        }
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let server = ImsServer::open(config).context("opening release storage")?;
    println!(
        "{} IMS release server on {} (images: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().image_directory.display()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    write_default_config(&args.path, args.force)?;
    println!("{} Wrote {}", "✓".green().bold(), args.path.display().to_string().bold());
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = ServerConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn cmd_check_config(args: ConfigArg, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    config.validate()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("{} Configuration is valid", "✓".green().bold());
            println!("  Bind: {}", config.bind_addr.to_string().bold());
            println!("  Database: {}", config.database_path.display());
            println!("  Images: {}", config.image_directory.display());
            println!("  Scanlator: {}", config.scanlator.cyan());
            let auth = if config.auth_token.is_some() { "required".yellow() } else { "disabled".dimmed() };
            println!("  Auth token: {auth}");
        }
    }
    Ok(())
}

fn cmd_purge_project(args: PurgeProjectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let catalog = open_catalog(&config).context("opening release storage")?;
    let summary = catalog.purge_project(args.project_id)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "project": args.project_id,
                "pages": summary.pages,
                "releases": summary.releases,
            })
        ),
        OutputFormat::Text => println!(
            "{} Purged project {}: {} release(s), {} page(s)",
            "✓".green().bold(),
            args.project_id.to_string().yellow(),
            summary.releases,
            summary.pages
        ),
    }
    Ok(())
}
