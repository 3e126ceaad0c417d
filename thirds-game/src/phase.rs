use crate::config::GameConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game phases in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    WaitingForPlayers,
    GameStarting,
    Commit,
    Reveal,
    Evaluating,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            Phase::GameStarting => "GAME_STARTING",
            Phase::Commit => "COMMIT",
            Phase::Reveal => "REVEAL",
            Phase::Evaluating => "EVALUATING",
            Phase::Ended => "ENDED",
        };
        f.write_str(name)
    }
}

/// Window boundaries fixed by the moment quorum was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub quorum_reached_at: u64,
    pub commit_start: u64,
    pub commit_end: u64,
    pub reveal_end: u64,
}

impl Schedule {
    pub fn new(config: &GameConfig, quorum_reached_at: u64) -> Self {
        let commit_start = quorum_reached_at.saturating_add(config.auto_start_delay);
        let commit_end = commit_start.saturating_add(config.commit_duration);
        let reveal_end = commit_end.saturating_add(config.reveal_duration);

        Self {
            quorum_reached_at,
            commit_start,
            commit_end,
            reveal_end,
        }
    }

    /// Phase at `now`, assuming quorum holds and the game is not finalized.
    pub fn phase_at(&self, now: u64) -> Phase {
        if now < self.commit_start {
            Phase::GameStarting
        } else if now < self.commit_end {
            Phase::Commit
        } else if now < self.reveal_end {
            Phase::Reveal
        } else {
            Phase::Evaluating
        }
    }

    /// End of the window containing `now`, if a timed window is running.
    pub fn window_end(&self, now: u64) -> Option<u64> {
        match self.phase_at(now) {
            Phase::GameStarting => Some(self.commit_start),
            Phase::Commit => Some(self.commit_end),
            Phase::Reveal => Some(self.reveal_end),
            _ => None,
        }
    }
}

/// Pure phase derivation.
pub fn derive_phase(
    finalized: bool,
    roster_len: usize,
    config: &GameConfig,
    quorum_reached_at: Option<u64>,
    now: u64,
) -> Phase {
    if finalized {
        return Phase::Ended;
    }

    if roster_len < config.min_players {
        return Phase::WaitingForPlayers;
    }

    match quorum_reached_at {
        Some(at) => Schedule::new(config, at).phase_at(now),
        None => Phase::WaitingForPlayers,
    }
}
