// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            config,
            root,
            dry_run,
            no_publish,
        } => commands::cmd_run(config.as_deref(), root.as_deref(), dry_run, no_publish),
        Commands::Diff { old, new } => commands::cmd_diff(&old, &new),
        Commands::Classify { filename, version } => commands::cmd_classify(&filename, &version),
        Commands::Rollback {
            codename,
            filename,
            version,
            config,
        } => commands::cmd_rollback(&codename, &filename, &version, config.as_deref()),
        Commands::Render {
            record,
            rolled_back,
        } => commands::cmd_render(&record, rolled_back),
    }
}
