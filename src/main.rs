use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxboard::cli::setup::setup;
use fxboard::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxboard::AppCommand {
    fn from(cmd: Commands) -> fxboard::AppCommand {
        match cmd {
            Commands::Rates { watch, refresh } => fxboard::AppCommand::Rates { watch, refresh },
            Commands::History { currency } => fxboard::AppCommand::History { currency },
            Commands::Convert { amount, from, to } => {
                fxboard::AppCommand::Convert { amount, from, to }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the current exchange rate board
    Rates {
        /// Keep polling and redraw the board
        #[arg(short, long)]
        watch: bool,
        /// Ignore cached rates and fetch from the banks
        #[arg(short, long)]
        refresh: bool,
    },
    /// Display the recorded history for a currency
    History {
        /// Currency code, e.g. USD
        currency: String,
    },
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
