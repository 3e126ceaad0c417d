use crate::commands::{format_duration, format_timestamp, resolve_game, short_id, CommandContext};
use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use thirds_core::{Amount, PlayerId};
use thirds_game::{commit, Game, PlayerState, Salt};

#[derive(Subcommand)]
pub enum ViewCommands {
    /// Show phase, schedule, players and results of a game
    Status {
        #[arg(short, long)]
        game: Option<String>,
    },
    /// List all games in the registry
    List,
    /// Compute the commitment for a guess and salt
    Hash {
        guess: u32,
        /// Salt as 64 hex chars
        salt: String,
    },
    /// Show ledger balance and pending withdrawals
    Balance {
        /// Player identity (defaults to --as)
        player: Option<String>,
    },
}

pub async fn handle_view_command(cmd: ViewCommands, ctx: &CommandContext) -> Result<()> {
    if let ViewCommands::Hash { guess, salt } = &cmd {
        let salt = Salt::from_hex(salt)?;
        println!("{}", commit(*guess, &salt));
        return Ok(());
    }

    let session = ctx.store.load().await?;
    let registry = &session.registry;

    match cmd {
        ViewCommands::Status { game } => {
            let game = resolve_game(registry, game.as_deref())?;
            print_status(&game);
        }

        ViewCommands::List => {
            let games = registry.games();
            if games.is_empty() {
                println!("No games yet");
                return Ok(());
            }

            let current = registry.current().map(|g| g.id());
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["", "Game", "Phase", "Players", "Entry fee", "Pool", "Winner"]);
            for game in games {
                let info = game.info();
                table.add_row(vec![
                    if current == Some(info.id) { "*" } else { "" }.to_string(),
                    short_id(&info.id),
                    info.phase.to_string(),
                    format!("{}/{}", info.player_count, info.config.max_players),
                    info.config.entry_fee.to_string(),
                    info.prize_pool.to_string(),
                    info.winner.map(|w| w.to_string()).unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }

        ViewCommands::Balance { player } => {
            let player = match player {
                Some(name) => PlayerId::new(name),
                None => ctx.caller()?.clone(),
            };

            let balance = session.ledger.balance(&player);
            println!("Player: {}", player);
            println!("Available: {}", balance.available);

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Game", "Phase", "Pending withdrawal"]);
            let mut pending_total = Amount::ZERO;
            for game in registry.games() {
                let pending = game.pending_withdrawal(&player);
                if pending.is_zero() {
                    continue;
                }
                pending_total = pending_total.checked_add(pending)?;
                table.add_row(vec![
                    short_id(&game.id()),
                    game.phase().to_string(),
                    pending.to_string(),
                ]);
            }

            if pending_total.is_zero() {
                println!("Nothing to withdraw");
            } else {
                println!("{}", table);
                println!("Withdrawable: {}", pending_total);
            }
        }

        // handled before loading
        ViewCommands::Hash { .. } => {}
    }

    Ok(())
}

fn print_status(game: &Game) {
    let info = game.info();

    println!("Game: {}", info.id);
    println!("Administrator: {}", info.admin);
    println!("Phase: {}", info.phase);
    println!(
        "Players: {}/{} (quorum {})",
        info.player_count, info.config.max_players, info.config.min_players
    );
    println!("Entry fee: {}", info.config.entry_fee);
    println!("Prize pool: {}", info.prize_pool);

    if let Some(schedule) = info.schedule {
        println!();
        println!("Quorum reached: {}", format_timestamp(schedule.quorum_reached_at));
        println!("Commits open:   {}", format_timestamp(schedule.commit_start));
        println!("Reveals open:   {}", format_timestamp(schedule.commit_end));
        println!("Reveals close:  {}", format_timestamp(schedule.reveal_end));
    }
    if let Some(left) = info.time_remaining {
        println!("Time remaining in {}: {}", info.phase, format_duration(left));
    }

    let players = game.players();
    if !players.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Player", "Joined", "State", "Commitment", "Guess"]);
        for player in players {
            let state = match player.state {
                PlayerState::Joined => "joined",
                PlayerState::Committed => "committed",
                PlayerState::Revealed => "revealed",
            };
            table.add_row(vec![
                player.id.to_string(),
                format_timestamp(player.joined_at),
                state.to_string(),
                player
                    .commitment
                    .map(|c| c.to_hex()[..16].to_string())
                    .unwrap_or_default(),
                player
                    .revealed_guess
                    .map(|g| g.to_string())
                    .unwrap_or_default(),
            ]);
        }
        println!();
        println!("{}", table);
    }

    if let Ok(outcome) = game.results() {
        println!();
        if outcome.is_forfeit() {
            println!("No reveals: {} forfeited to {}", outcome.prize_pool, outcome.winner);
        } else {
            println!("Average: {}  Target: {}", outcome.average, outcome.target);
            println!("Winner: {} ({})", outcome.winner, outcome.winner_prize);
            if outcome.tied.len() > 1 {
                let tied: Vec<String> = outcome.tied.iter().map(|p| p.to_string()).collect();
                println!("Tied: {}", tied.join(", "));
            }
            println!("Service fee: {}", outcome.service_fee);
        }
        println!("Finalized: {}", format_timestamp(outcome.finalized_at));
    }
}
