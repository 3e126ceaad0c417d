use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use thirds_core::Amount;

pub const MIN_PLAYERS_FLOOR: usize = 3;
pub const MAX_SERVICE_FEE_PERCENT: u8 = 20;

/// Parameters fixed for the lifetime of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    /// Seconds
    pub commit_duration: u64,
    /// Seconds
    pub reveal_duration: u64,
    pub entry_fee: Amount,
    pub service_fee_percent: u8,
    /// Grace period after quorum before commits open, in seconds.
    pub auto_start_delay: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 10,
            commit_duration: 600,
            reveal_duration: 600,
            entry_fee: Amount::from_units(1_000),
            service_fee_percent: 5,
            auto_start_delay: 120,
        }
    }
}

impl GameConfig {
    pub fn with_players(mut self, min_players: usize, max_players: usize) -> Self {
        self.min_players = min_players;
        self.max_players = max_players;
        self
    }

    pub fn with_durations(mut self, commit: u64, reveal: u64, auto_start_delay: u64) -> Self {
        self.commit_duration = commit;
        self.reveal_duration = reveal;
        self.auto_start_delay = auto_start_delay;
        self
    }

    pub fn with_entry_fee(mut self, entry_fee: Amount) -> Self {
        self.entry_fee = entry_fee;
        self
    }

    pub fn with_service_fee_percent(mut self, percent: u8) -> Self {
        self.service_fee_percent = percent;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_players < MIN_PLAYERS_FLOOR {
            return Err(GameError::config(format!(
                "min_players must be at least {}",
                MIN_PLAYERS_FLOOR
            )));
        }

        if self.max_players <= self.min_players {
            return Err(GameError::config(
                "max_players must be greater than min_players",
            ));
        }

        if self.commit_duration == 0 {
            return Err(GameError::config("commit_duration must be greater than 0"));
        }

        if self.reveal_duration == 0 {
            return Err(GameError::config("reveal_duration must be greater than 0"));
        }

        if self.service_fee_percent > MAX_SERVICE_FEE_PERCENT {
            return Err(GameError::config(format!(
                "service_fee_percent must be at most {}",
                MAX_SERVICE_FEE_PERCENT
            )));
        }

        if self.auto_start_delay == 0 {
            return Err(GameError::config("auto_start_delay must be greater than 0"));
        }

        Ok(())
    }
}
