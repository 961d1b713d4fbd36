//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use roomclimate_types::ThresholdConfig;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Threshold overrides applied on top of the configuration file
#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// Temperature above which a room is flagged (°C)
    #[arg(long, global = true, env = "ROOMCLIMATE_TEMP_HIGH")]
    pub temp_high: Option<f32>,

    /// Humidity below which a room is flagged (%)
    #[arg(long, global = true, env = "ROOMCLIMATE_HUM_LOW")]
    pub hum_low: Option<f32>,

    /// CO2 above which a room is flagged (ppm)
    #[arg(long, global = true, env = "ROOMCLIMATE_CO2_HIGH")]
    pub co2_high: Option<f32>,
}

impl ThresholdArgs {
    /// Resolve thresholds: explicit flags override config
    pub fn apply(&self, config: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            temp_high: self.temp_high.unwrap_or(config.temp_high),
            hum_low: self.hum_low.unwrap_or(config.hum_low),
            co2_high: self.co2_high.unwrap_or(config.co2_high),
        }
    }
}

#[derive(Parser)]
#[command(name = "roomclimate")]
#[command(author, version, about = "Simulated room climate telemetry and alerts", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "ROOMCLIMATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed the simulation for reproducible output
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// One line per room with its current reading and alerts
    Status,

    /// Current reading, alerts and history of one room
    Room {
        /// Room id (1-10)
        id: u8,
    },

    /// Run the simulation and report new points and alert changes
    Watch {
        /// Wall seconds between ticks (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of ticks before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u64,

        /// Simulated seconds per wall second (overrides config)
        #[arg(short = 's', long)]
        time_scale: Option<f64>,
    },

    /// Show the effective configuration
    Config {
        /// Print the configuration file path instead
        #[arg(long, conflicts_with = "init")]
        path: bool,

        /// Write the effective configuration to the configuration file
        #[arg(long)]
        init: bool,
    },
}
