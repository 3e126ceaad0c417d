use crate::phase::Phase;
use crate::GameId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Thirds core error: {0}")]
    Core(#[from] thirds_core::CoreError),

    #[error("Invalid game configuration: {0}")]
    ConfigInvalid(String),

    #[error("Cannot {operation} while game is in phase {phase}")]
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Caller is not authorized")]
    NotAuthorized,

    #[error("Game not found: {0}")]
    NotFound(GameId),

    #[error("Player already joined")]
    AlreadyJoined,

    #[error("Commitment already submitted")]
    AlreadyCommitted,

    #[error("Guess already revealed")]
    AlreadyRevealed,

    #[error("Game is full")]
    GameFull,

    #[error("Wrong stake: entry fee is {expected} units, got {supplied} units")]
    WrongStake { expected: u64, supplied: u64 },

    #[error("Caller is not a player in this game")]
    NotAPlayer,

    #[error("No commitment submitted")]
    NoCommitment,

    #[error("Invalid reveal: {0}")]
    InvalidReveal(String),

    #[error("No funds to withdraw")]
    NoFunds,

    #[error("Results are not available until the game has ended (phase {0})")]
    ResultsNotReady(Phase),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Corrupt game record: {0}")]
    CorruptRecord(String),
}

impl GameError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }

    pub fn invalid_reveal(msg: impl Into<String>) -> Self {
        Self::InvalidReveal(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptRecord(msg.into())
    }

    pub(crate) fn wrong_phase(operation: &'static str, phase: Phase) -> Self {
        Self::WrongPhase { operation, phase }
    }
}
