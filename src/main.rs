use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use diiflip::core::log::init_logging;

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

impl From<Commands> for diiflip::AppCommand {
    fn from(cmd: Commands) -> diiflip::AppCommand {
        match cmd {
            Commands::Rates => diiflip::AppCommand::Rates,
            Commands::Convert { amount, from, to } => {
                diiflip::AppCommand::Convert { amount, from, to }
            }
            Commands::Session => diiflip::AppCommand::Session,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the latest exchange rates
    Rates,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency (RWF, RUB, USD or EUR)
        from: String,
        /// Target currency (RWF, RUB, USD or EUR)
        to: String,
    },
    /// Start an interactive session with history and notes
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => diiflip::cli::setup::setup(),
        Some(cmd) => diiflip::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
