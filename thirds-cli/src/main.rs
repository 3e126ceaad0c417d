mod commands;
mod config;
mod store;

use clap::{Parser, Subcommand};
use commands::CommandContext;
use config::CliConfig;
use std::path::PathBuf;
use store::Store;
use thirds_core::{CoreError, PlayerId};
use thirds_game::GameError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "thirds")]
#[command(about = "Two-thirds of the average guessing game with commit-reveal rounds")]
#[command(version)]
struct Cli {
    /// Data directory for the registry file
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Identity to act as
    #[arg(long = "as", global = true, value_name = "IDENTITY")]
    caller: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a registry with ADMIN as administrator
    Init {
        admin: String,
        #[command(flatten)]
        config: commands::ConfigArgs,
    },

    #[command(flatten)]
    Admin(commands::AdminCommands),

    #[command(flatten)]
    Round(commands::RoundCommands),

    #[command(flatten)]
    View(commands::ViewCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = CliConfig::new(cli.data_dir, cli.caller, cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(cfg.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ctx = CommandContext {
        store: Store::new(&cfg.data_dir),
        caller: cfg.caller.clone().map(PlayerId::new),
    };

    let result = match cli.command {
        Commands::Init { admin, config } => commands::init_registry(&ctx, &admin, &config).await,
        Commands::Admin(cmd) => commands::handle_admin_command(cmd, &ctx).await,
        Commands::Round(cmd) => commands::handle_round_command(cmd, &ctx).await,
        Commands::View(cmd) => commands::handle_view_command(cmd, &ctx).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<GameError>() {
            Some(GameError::WrongPhase { operation, phase }) => {
                eprintln!("Error: cannot {} while the game is in {}", operation, phase);
                eprintln!("Use 'thirds status' to see the schedule");
            }
            Some(GameError::NotAuthorized) => {
                eprintln!("Error: only the registry administrator can do that");
            }
            Some(GameError::NoFunds) => {
                eprintln!("Error: nothing to withdraw");
            }
            Some(GameError::InvalidReveal(reason)) => {
                eprintln!("Error: invalid reveal: {}", reason);
                eprintln!("Reveal the exact guess and salt you committed to");
            }
            Some(GameError::Core(CoreError::InsufficientFunds { need, available })) => {
                eprintln!("Error: Insufficient funds");
                eprintln!("Need: {} units, Available: {} units", need, available);
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }
}
