use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use stratfolio::cli::setup::setup;
use stratfolio::core::log::init_logging;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Split a cash amount across a strategy's securities
    Allocate {
        /// Amount to invest in USD, e.g. 10000 or $12,500
        #[arg(short, long)]
        amount: String,

        /// One of: ethical, growth, index, quality, value
        #[arg(short, long)]
        strategy: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the available investment strategies
    Strategies,
}

impl From<Commands> for stratfolio::AppCommand {
    fn from(cmd: Commands) -> stratfolio::AppCommand {
        match cmd {
            Commands::Allocate {
                amount,
                strategy,
                json,
            } => stratfolio::AppCommand::Allocate {
                amount,
                strategy,
                json,
            },
            Commands::Strategies => stratfolio::AppCommand::Strategies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => stratfolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
