// ABOUTME: Entry point for the skylift CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use skylift::config::{self, Config};
use skylift::error::{ErrorClass, Result};
use skylift::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise follow the verbose flag
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode: OutputMode = cli.output.into();
    let verbose = cli.verbose;

    if let Err(e) = run(cli).await {
        let output = Output::new(mode);
        if e.class() == ErrorClass::UserAbort {
            output.warning(&e.to_string());
        } else if verbose {
            output.error(&format!("{e:?}"));
        } else {
            output.error(&e.to_string());
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let project_dir = match cli.dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };

    if let Commands::Init { force } = cli.command {
        config::init_config(&project_dir, force)?;
        Output::new(cli.output.into()).success(&format!(
            "Created {}",
            project_dir.join(config::CONFIG_FILENAME).display()
        ));
        return Ok(());
    }

    let ctx = Context {
        config: Config::discover(&project_dir)?,
        project_dir,
        verbose: cli.verbose,
        mode: cli.output.into(),
    };

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Infra { action } => commands::infra(&ctx, action).await,
        Commands::Deploy {
            dry_run,
            from_infra,
            lock,
        } => commands::deploy(&ctx, dry_run, from_infra, lock.force_unlock).await,
        Commands::Health => commands::health(&ctx).await,
    }
}
