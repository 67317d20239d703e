//! Configuration file CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use clap::Subcommand;
use xgps::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective settings
    Show,

    /// Write a commented default configuration file
    Init {
        /// Replace an existing file with the defaults
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let serial = &config.serial;

    println!("Configuration ({})", config_file_path().display());
    println!();
    println!("[simulator]");
    println!(
        "  address = {}",
        config
            .simulator
            .address
            .map(|a| a.to_string())
            .unwrap_or_else(|| "(discover)".to_string())
    );
    println!("  frequency = {}", config.simulator.frequency);
    println!(
        "  discovery_timeout = {}",
        config.simulator.discovery_timeout
    );
    println!();
    println!("[serial]");
    if serial.port.is_empty() {
        println!("  port = (not set)");
    } else {
        println!("  port = {}", serial.port);
    }
    println!("  baud_rate = {}", serial.baud_rate);
    println!("  data_bits = {}", serial.data_bits);
    println!("  parity = {}", serial.parity);
    println!("  stop_bits = {}", serial.stop_bits);
    println!();
    println!("[nmea]");
    println!("  precision = {}", config.nmea.precision);
    let sentences: Vec<&str> = config.nmea.sentences.iter().map(|s| s.as_str()).collect();
    println!("  sentences = {}", sentences.join(", "));
    println!();
    println!("[logging]");
    println!("  file = {}", config.logging.file.display());

    Ok(())
}

fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();

    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote defaults to {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Created {}", path.display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Ok(())
}
