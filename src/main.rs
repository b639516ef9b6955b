//! CLI Entry Point for offloader-daq
//!
//! Provides command-line interface for:
//! - Taking one position measurement from the Hall sensor
//! - Printing the effective configuration
//!
//! # Usage
//!
//! Measure with the simulated sensor:
//! ```bash
//! offloader-daq measure --backend mock --samples 50
//! ```
//!
//! Measure from a Comedi board and emit JSON:
//! ```bash
//! offloader-daq measure --device /dev/comedi0 --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use offloader_daq::acquisition;
use offloader_daq::config::{AppConfig, Backend, Overrides};
use offloader_daq::logging::{self, LogFormat};
use offloader_daq::report::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "offloader-daq")]
#[command(version, about = "Hall-sensor position readout for the offloader/snubber", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire once and print the position report
    Measure {
        /// Configuration file (default: config/offloader.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sample pairs to average
        #[arg(long)]
        samples: Option<usize>,

        /// Acquisition backend
        #[arg(long, value_enum)]
        backend: Option<Backend>,

        /// Comedi device node, e.g. /dev/comedi0
        #[arg(long)]
        device: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Log output format (logs go to stderr)
        #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
        log_format: LogFormat,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file (default: config/offloader.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Measure {
            config,
            samples,
            backend,
            device,
            format,
            log_format,
        } => {
            let overrides = Overrides {
                samples,
                backend,
                device_path: device,
            };
            measure(config, &overrides, format, log_format)
        }
        Commands::Config { config } => {
            let config = AppConfig::load(config.as_deref(), &Overrides::default())?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn measure(
    config_path: Option<PathBuf>,
    overrides: &Overrides,
    format: ReportFormat,
    log_format: LogFormat,
) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref(), overrides)?;
    logging::init_from_config(&config, log_format)?;

    let report = acquisition::measure(&config).context("Measurement failed")?;
    println!("{}", report.render(format)?);
    Ok(())
}
