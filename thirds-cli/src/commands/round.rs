use crate::commands::{format_duration, resolve_game, short_id, CommandContext};
use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Password;
use thirds_core::Amount;
use thirds_game::{commit, generate_salt, Commitment, Phase, Salt, MAX_GUESS};

#[derive(Subcommand)]
pub enum RoundCommands {
    /// Join a game by staking the entry fee
    Join {
        /// Game ID or prefix (defaults to the current game)
        #[arg(short, long)]
        game: Option<String>,
        /// Stake in units (defaults to the entry fee)
        #[arg(long)]
        stake: Option<u64>,
    },
    /// Leave a game that has not reached quorum yet
    Leave {
        #[arg(short, long)]
        game: Option<String>,
    },
    /// Commit to a hidden guess
    Commit {
        #[arg(short, long)]
        game: Option<String>,
        /// Guess in 0..=1000; the commitment is computed locally
        #[arg(long, required_unless_present = "hash")]
        guess: Option<u32>,
        /// Salt as 64 hex chars (random when omitted)
        #[arg(long, requires = "guess")]
        salt: Option<String>,
        /// Precomputed commitment as 64 hex chars
        #[arg(long, conflicts_with_all = ["guess", "salt"])]
        hash: Option<String>,
    },
    /// Reveal the committed guess
    Reveal {
        /// The guess committed to
        guess: u32,
        #[arg(short, long)]
        game: Option<String>,
        /// Salt used for the commitment (prompted when omitted)
        #[arg(long)]
        salt: Option<String>,
    },
    /// Settle a game whose reveal window has closed
    Finalize {
        #[arg(short, long)]
        game: Option<String>,
    },
    /// Withdraw everything credited to you in a game
    Withdraw {
        #[arg(short, long)]
        game: Option<String>,
    },
}

pub async fn handle_round_command(cmd: RoundCommands, ctx: &CommandContext) -> Result<()> {
    let session = ctx.store.load().await?;
    let registry = &session.registry;

    match cmd {
        RoundCommands::Join { game, stake } => {
            let caller = ctx.caller()?;
            let game = resolve_game(registry, game.as_deref())?;
            let stake = stake
                .map(Amount::from_units)
                .unwrap_or(game.config().entry_fee);

            game.join(caller, stake)?;

            let info = game.info();
            println!("Joined game {} with {}", game.id(), stake);
            println!(
                "Players: {}/{} (quorum {})",
                info.player_count, info.config.max_players, info.config.min_players
            );
            match (info.phase, info.time_remaining) {
                (Phase::GameStarting, Some(left)) => {
                    println!("Quorum reached! Commits open in {}", format_duration(left))
                }
                _ => println!("Waiting for more players..."),
            }
        }

        RoundCommands::Leave { game } => {
            let caller = ctx.caller()?;
            let game = resolve_game(registry, game.as_deref())?;
            let refund = game.leave(caller)?;

            println!("Left game {}", game.id());
            println!("{} credited; claim it with:", refund);
            println!("thirds --as {} withdraw --game {}", caller, short_id(&game.id()));
        }

        RoundCommands::Commit {
            game,
            guess,
            salt,
            hash,
        } => {
            let caller = ctx.caller()?;
            let game = resolve_game(registry, game.as_deref())?;

            let (commitment, secret) = match (hash, guess) {
                (Some(hash), _) => (Commitment::from_hex(&hash)?, None),
                (None, Some(guess)) => {
                    if guess > MAX_GUESS {
                        bail!("Guess must be between 0 and {}", MAX_GUESS);
                    }
                    let salt = match salt {
                        Some(hex) => Salt::from_hex(&hex)?,
                        None => generate_salt(),
                    };
                    (commit(guess, &salt), Some((guess, salt)))
                }
                (None, None) => bail!("Pass either --guess or --hash"),
            };

            game.commit(caller, commitment)?;

            println!("Commitment submitted for game {}", game.id());
            println!("Commitment: {}", commitment);
            if let Some((guess, salt)) = secret {
                println!();
                println!("Your salt (save this for reveal): {}", salt);
                println!("Reveal during the reveal window with:");
                println!(
                    "thirds --as {} reveal {} --game {} --salt {}",
                    caller,
                    guess,
                    short_id(&game.id()),
                    salt
                );
            }
        }

        RoundCommands::Reveal { guess, game, salt } => {
            let caller = ctx.caller()?;
            let game = resolve_game(registry, game.as_deref())?;
            let salt_hex = match salt {
                Some(hex) => hex,
                None => Password::new().with_prompt("Salt (hex)").interact()?,
            };
            let salt = Salt::from_hex(&salt_hex)?;

            game.reveal(caller, guess, &salt)?;
            println!("Revealed {} in game {}", guess, game.id());
        }

        RoundCommands::Finalize { game } => {
            let game = resolve_game(registry, game.as_deref())?;
            let outcome = game.finalize()?;

            println!("------ GAME ENDED ------");
            println!("═══════════════════════════════════");
            if outcome.is_forfeit() {
                println!("Nobody revealed; the pool goes to {}", outcome.winner);
                println!("Forfeited: {}", outcome.winner_prize);
            } else {
                println!("Reveals: {}", outcome.reveal_count);
                println!("Average: {}", outcome.average);
                println!("Target (2/3): {}", outcome.target);
                if outcome.tied.len() > 1 {
                    println!("Tie between {} players, broken pseudo-randomly", outcome.tied.len());
                }
                println!("Winner!: {}", outcome.winner);
                println!("Prize: {}", outcome.winner_prize);
                println!("Service fee: {}", outcome.service_fee);
            }
        }

        RoundCommands::Withdraw { game } => {
            let caller = ctx.caller()?;
            let game = resolve_game(registry, game.as_deref())?;
            let amount = game.withdraw(caller)?;

            println!("Withdrew {} from game {}", amount, game.id());
            println!(
                "Ledger balance: {}",
                session.ledger.balance(caller).available
            );
        }
    }

    ctx.store.save(session).await
}
