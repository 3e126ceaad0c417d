//! Two-thirds of the average, played with stakes
//!
//! Players join by staking the entry fee, commit to a hidden guess in
//! `0..=1000`, then reveal it. The revealed guess closest to two thirds of
//! the average takes the pool minus the service fee. Phases are derived from
//! the clock, so only finalization needs an explicit call.

pub mod commitment;
pub mod config;
pub mod error;
pub mod game;
pub mod phase;
pub mod player;
pub mod registry;
pub mod resolution;

pub use commitment::{commit, generate_salt, Commitment, CommitmentScheme, Salt, Sha256Scheme};
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::{Game, GameInfo, GameRecord};
pub use phase::{Phase, Schedule};
pub use player::{Player, PlayerState, PlayerStatus, MAX_GUESS};
pub use registry::{GameRegistry, RegistrySnapshot};
pub use resolution::Outcome;

/// Registry handle of a game.
pub type GameId = uuid::Uuid;
