// ABOUTME: Entry point for the swapcam CLI application.
// ABOUTME: Parses arguments, initialises tracing, dispatches commands, and maps errors to exit codes.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use swapcam::config::{self, Config};
use swapcam::error::{Error, Result};
use swapcam::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose selects debug.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);
    let result = run(cli, mode).await;

    if let Err(e) = result {
        let output = Output::new(mode);
        match &e {
            Error::Switch(failure) => {
                output.switch_failed(&failure.operation, failure.step, &failure.to_string())
            }
            _ => output.error(&e.to_string()),
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let cwd = env::current_dir()?;
    match cli.command {
        Commands::Init {
            default_color,
            force,
        } => {
            let dir = cli
                .config
                .as_deref()
                .and_then(|p| p.parent())
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(cwd.as_path());
            config::init_config(dir, default_color, force)?;
            Output::new(mode).success(&format!(
                "Created {}",
                dir.join(config::CONFIG_FILENAME).display()
            ));
            Ok(())
        }
        Commands::Switch { force, skip_hooks } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::switch(config, force, skip_hooks, Output::new(mode)).await
        }
        Commands::Status => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::status(&config, &Output::new(mode)).await
        }
        Commands::Render { color } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::render(&config, color)
        }
    }
}

fn load_config(path: Option<&std::path::Path>, cwd: &std::path::Path) -> Result<Config> {
    match path {
        Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
        Some(path) => Config::load(path),
        None => Config::discover(cwd),
    }
}
