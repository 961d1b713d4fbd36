use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use roomclimate_core::{Clock, Registry, SystemClock};

mod cli;
mod commands;
mod config;
mod format;
mod util;

use cli::{Cli, Commands};
use commands::{WatchArgs, cmd_config, cmd_room, cmd_status, cmd_watch};
use config::{Config, default_config_path};
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable.
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    // The config command may create the file it points at.
    let allow_missing = matches!(cli.command, Commands::Config { .. });
    let mut config = load_config(cli.config.as_ref(), allow_missing)?;
    config.thresholds = cli.thresholds.apply(config.thresholds);
    config
        .thresholds
        .validate()
        .context("Invalid threshold override")?;

    let opts = FormatOptions::new(cli.no_color);
    let output = cli.output.as_ref();

    match cli.command {
        Commands::Config { path, init } => {
            cmd_config(
                &config,
                &config_path,
                path,
                init,
                cli.format,
                output,
                cli.quiet,
            )?;
        }
        Commands::Status => {
            let registry = build_registry(&config, cli.seed);
            cmd_status(&registry, cli.format, output, &opts)?;
        }
        Commands::Room { id } => {
            let registry = build_registry(&config, cli.seed);
            cmd_room(&registry, id, cli.format, output, &opts)?;
        }
        Commands::Watch {
            interval,
            count,
            time_scale,
        } => {
            let refresh_secs = interval.unwrap_or(config.simulation.refresh_secs).max(1);
            let time_scale = time_scale.unwrap_or(config.simulation.time_scale);
            let registry = Arc::new(build_registry(&config, cli.seed));
            let args = WatchArgs {
                refresh: Duration::from_secs(refresh_secs),
                count,
                time_scale,
            };
            cmd_watch(registry, args, cli.format, output, &opts, cli.quiet).await?;
        }
    }

    Ok(())
}

/// Load configuration from an explicit path, or the default location.
///
/// An explicit path must exist unless `allow_missing` is set; the default
/// path is always optional.
fn load_config(path: Option<&PathBuf>, allow_missing: bool) -> Result<Config> {
    match path {
        Some(path) if allow_missing && !path.exists() => Ok(Config::default()),
        Some(path) => Config::load_validated(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => {
            let config = Config::load_default().context("Failed to load configuration")?;
            config.validate()?;
            Ok(config)
        }
    }
}

fn build_registry(config: &Config, seed: Option<u64>) -> Registry {
    let now = SystemClock.now();
    let registry_config = config.registry_config();
    match seed {
        Some(seed) => {
            tracing::debug!("Seeding simulation with {}", seed);
            Registry::with_seed(now, registry_config, seed)
        }
        None => Registry::new(now, registry_config),
    }
}
