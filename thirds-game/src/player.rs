use crate::commitment::{Commitment, CommitmentScheme, Salt, Sha256Scheme};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use thirds_core::PlayerId;

pub const MAX_GUESS: u32 = 1000;

/// Player state in the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Joined,
    Committed,
    Revealed,
}

/// player in a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    joined_at: u64,
    commitment: Option<Commitment>,
    revealed_guess: Option<u32>,
}

impl Player {
    pub fn new(id: PlayerId, joined_at: u64) -> Self {
        Self {
            id,
            joined_at,
            commitment: None,
            revealed_guess: None,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn state(&self) -> PlayerState {
        match (self.commitment, self.revealed_guess) {
            (_, Some(_)) => PlayerState::Revealed,
            (Some(_), None) => PlayerState::Committed,
            (None, None) => PlayerState::Joined,
        }
    }

    pub fn has_committed(&self) -> bool {
        self.commitment.is_some()
    }

    pub fn has_revealed(&self) -> bool {
        self.revealed_guess.is_some()
    }

    pub fn commitment(&self) -> Option<&Commitment> {
        self.commitment.as_ref()
    }

    pub fn revealed_guess(&self) -> Option<u32> {
        self.revealed_guess
    }

    /// Store the commitment; a player commits at most once.
    pub fn submit_commitment(&mut self, commitment: Commitment) -> Result<()> {
        if self.commitment.is_some() {
            return Err(GameError::AlreadyCommitted);
        }

        self.commitment = Some(commitment);
        Ok(())
    }

    /// Open the commitment with the guess and salt it was built from.
    pub fn reveal(&mut self, guess: u32, salt: &Salt) -> Result<()> {
        let commitment = self.commitment.as_ref().ok_or(GameError::NoCommitment)?;

        if self.revealed_guess.is_some() {
            return Err(GameError::AlreadyRevealed);
        }

        if !Sha256Scheme::verify(commitment, guess, salt) {
            return Err(GameError::invalid_reveal(
                "guess and salt do not match the stored commitment",
            ));
        }

        if guess > MAX_GUESS {
            return Err(GameError::invalid_reveal(format!(
                "guess {} is outside 0..={}",
                guess, MAX_GUESS
            )));
        }

        self.revealed_guess = Some(guess);
        Ok(())
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            id: self.id.clone(),
            state: self.state(),
            committed: self.has_committed(),
            revealed: self.has_revealed(),
            commitment: self.commitment,
            revealed_guess: self.revealed_guess,
            joined_at: self.joined_at,
        }
    }
}

/// Read-only view of a player's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub id: PlayerId,
    pub state: PlayerState,
    pub committed: bool,
    pub revealed: bool,
    pub commitment: Option<Commitment>,
    pub revealed_guess: Option<u32>,
    pub joined_at: u64,
}
