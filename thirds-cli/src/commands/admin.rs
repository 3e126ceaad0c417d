use crate::commands::{resolve_game, short_id, CommandContext};
use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use thirds_core::{Amount, PlayerId};
use thirds_game::GameConfig;

/// Optional overrides on top of a base game configuration.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Players needed before the game starts
    #[arg(long)]
    pub min_players: Option<usize>,
    /// Maximum number of players
    #[arg(long)]
    pub max_players: Option<usize>,
    /// Commit window in seconds
    #[arg(long)]
    pub commit_secs: Option<u64>,
    /// Reveal window in seconds
    #[arg(long)]
    pub reveal_secs: Option<u64>,
    /// Grace period between quorum and the commit window, in seconds
    #[arg(long)]
    pub start_delay: Option<u64>,
    /// Entry fee in units
    #[arg(long)]
    pub entry_fee: Option<u64>,
    /// Service fee percentage (0-20)
    #[arg(long)]
    pub fee_percent: Option<u8>,
}

impl ConfigArgs {
    pub fn is_empty(&self) -> bool {
        self.min_players.is_none()
            && self.max_players.is_none()
            && self.commit_secs.is_none()
            && self.reveal_secs.is_none()
            && self.start_delay.is_none()
            && self.entry_fee.is_none()
            && self.fee_percent.is_none()
    }

    pub fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(v) = self.min_players {
            config.min_players = v;
        }
        if let Some(v) = self.max_players {
            config.max_players = v;
        }
        if let Some(v) = self.commit_secs {
            config.commit_duration = v;
        }
        if let Some(v) = self.reveal_secs {
            config.reveal_duration = v;
        }
        if let Some(v) = self.start_delay {
            config.auto_start_delay = v;
        }
        if let Some(v) = self.entry_fee {
            config.entry_fee = Amount::from_units(v);
        }
        if let Some(v) = self.fee_percent {
            config.service_fee_percent = v;
        }
        config
    }
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Credit units to a player's ledger account
    Fund {
        /// Player identity
        player: String,
        /// Amount in units
        amount: u64,
    },
    /// Create a game (any override makes it a custom, admin-only game)
    Create {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show the default game parameters, or update them (admin only)
    Defaults {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Point the current game at GAME (admin only)
    Use {
        /// Game ID or unique prefix
        game: String,
    },
}

/// Create the registry file with ADMIN as administrator.
pub async fn init_registry(ctx: &CommandContext, admin: &str, config: &ConfigArgs) -> Result<()> {
    let defaults = config.apply(GameConfig::default());
    ctx.store.init(PlayerId::new(admin), defaults).await?;

    println!("Registry initialized at {}", ctx.store.path().display());
    println!("Administrator: {}", admin);
    Ok(())
}

pub async fn handle_admin_command(cmd: AdminCommands, ctx: &CommandContext) -> Result<()> {
    let session = ctx.store.load().await?;

    match cmd {
        AdminCommands::Fund { player, amount } => {
            let player = PlayerId::new(player);
            let balance = session.ledger.fund(&player, Amount::from_units(amount))?;
            println!("Funded {}: balance is now {}", player, balance);
        }

        AdminCommands::Create { config } => {
            let caller = ctx.caller()?;
            let game = if config.is_empty() {
                session.registry.create_game(caller)?
            } else {
                let custom = config.apply(session.registry.defaults());
                session.registry.create_custom_game(caller, custom)?
            };

            let info = game.info();
            println!("Created game {}", game.id());
            println!("Entry fee: {}", info.config.entry_fee);
            println!(
                "Players: {} to {}",
                info.config.min_players, info.config.max_players
            );
            println!();
            println!("Share this command with players:");
            println!("thirds --as <player> join --game {}", short_id(&game.id()));
        }

        AdminCommands::Defaults { config } => {
            if config.is_empty() {
                print_config(&session.registry.defaults());
                return Ok(());
            }

            let caller = ctx.caller()?;
            let updated = config.apply(session.registry.defaults());
            session.registry.set_defaults(caller, updated.clone())?;
            println!("Defaults updated:");
            print_config(&updated);
        }

        AdminCommands::Use { game } => {
            let caller = ctx.caller()?;
            let game = resolve_game(&session.registry, Some(&game))?;
            session.registry.set_current(caller, game.id())?;
            println!("Current game is now {}", game.id());
        }
    }

    ctx.store.save(session).await
}

fn print_config(config: &GameConfig) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Parameter", "Value"]);
    table.add_row(vec!["Min players".to_string(), config.min_players.to_string()]);
    table.add_row(vec!["Max players".to_string(), config.max_players.to_string()]);
    table.add_row(vec![
        "Commit window".to_string(),
        format!("{}s", config.commit_duration),
    ]);
    table.add_row(vec![
        "Reveal window".to_string(),
        format!("{}s", config.reveal_duration),
    ]);
    table.add_row(vec![
        "Start delay".to_string(),
        format!("{}s", config.auto_start_delay),
    ]);
    table.add_row(vec!["Entry fee".to_string(), config.entry_fee.to_string()]);
    table.add_row(vec![
        "Service fee".to_string(),
        format!("{}%", config.service_fee_percent),
    ]);
    println!("{}", table);
}
