//! xgps CLI - feed X-Plane positions to a serial GPS consumer.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::discover::DiscoverArgs;
use commands::run::RunArgs;
use commands::sentence::SentenceArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "xgps")]
#[command(version = xgps::VERSION)]
#[command(about = "Stream X-Plane positions to a serial GPS port", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find X-Plane on the local network
    Discover(DiscoverArgs),

    /// Stream positions until interrupted
    Run(RunArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print the sentences for a single position
    Sentence(SentenceArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        e.exit();
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Discover(args) => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::discover::run(&runner, args).await
        }
        Commands::Run(args) => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::run::run(&runner, args).await
        }
        Commands::Config(command) => commands::config::run(command),
        Commands::Sentence(args) => commands::sentence::run(args),
    }
}
