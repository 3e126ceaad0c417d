use crate::commitment::{Commitment, Salt};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::phase::{derive_phase, Phase, Schedule};
use crate::player::{Player, PlayerStatus};
use crate::resolution::{resolve, Outcome};
use crate::GameId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use thirds_core::{Amount, Clock, Ledger, PlayerId};
use uuid::Uuid;

/// Persisted state of one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub admin: PlayerId,
    pub config: GameConfig,
    pub created_at: u64,
    /// Join order; swap-removal on leave reorders it.
    pub roster: Vec<PlayerId>,
    pub players: HashMap<PlayerId, Player>,
    pub quorum_reached_at: Option<u64>,
    pub finalized: bool,
    pub prize_pool: Amount,
    pub pending_withdrawals: HashMap<PlayerId, Amount>,
    pub outcome: Option<Outcome>,
}

impl GameRecord {
    fn phase(&self, now: u64) -> Phase {
        derive_phase(
            self.finalized,
            self.roster.len(),
            &self.config,
            self.quorum_reached_at,
            now,
        )
    }

    fn schedule(&self) -> Option<Schedule> {
        self.quorum_reached_at
            .map(|at| Schedule::new(&self.config, at))
    }

    fn time_remaining(&self, now: u64) -> Option<u64> {
        match self.phase(now) {
            Phase::GameStarting | Phase::Commit | Phase::Reveal => self
                .schedule()
                .and_then(|schedule| schedule.window_end(now))
                .map(|end| end.saturating_sub(now)),
            _ => None,
        }
    }

    /// Structural checks for a record that did not come from a live game.
    fn check_consistency(&self) -> Result<()> {
        if self.roster.len() > self.config.max_players {
            return Err(GameError::corrupt(format!(
                "{} players on a roster capped at {}",
                self.roster.len(),
                self.config.max_players
            )));
        }

        if self.players.len() != self.roster.len() {
            return Err(GameError::corrupt(format!(
                "roster lists {} players but {} player records exist",
                self.roster.len(),
                self.players.len()
            )));
        }
        for id in &self.roster {
            match self.players.get(id) {
                Some(player) if player.id() == id => {}
                _ => {
                    return Err(GameError::corrupt(format!(
                        "roster entry {} has no matching player record",
                        id
                    )))
                }
            }
        }

        if self.finalized != self.outcome.is_some() {
            return Err(GameError::corrupt(
                "finalized flag and stored outcome disagree",
            ));
        }

        if self.quorum_reached_at.is_none() && self.roster.len() >= self.config.min_players {
            return Err(GameError::corrupt("quorum reached but never latched"));
        }

        if !self.finalized {
            let expected = self
                .config
                .entry_fee
                .to_units()
                .checked_mul(self.roster.len() as u64);
            if expected != Some(self.prize_pool.to_units()) {
                return Err(GameError::corrupt(format!(
                    "prize pool {} does not match {} staked players",
                    self.prize_pool,
                    self.roster.len()
                )));
            }
        }

        Ok(())
    }

    fn require_phase(&self, operation: &'static str, expected: Phase, now: u64) -> Result<()> {
        let phase = self.phase(now);
        if phase != expected {
            return Err(GameError::wrong_phase(operation, phase));
        }
        Ok(())
    }

    fn credit(
        pending: &mut HashMap<PlayerId, Amount>,
        to: &PlayerId,
        amount: Amount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let current = pending.get(to).copied().unwrap_or_default();
        pending.insert(to.clone(), current.checked_add(amount)?);
        Ok(())
    }
}

/// One round of the two-thirds game.
///
/// Every mutating call runs under the instance write lock, so each call is a
/// single atomic step against the round's state.
pub struct Game {
    id: GameId,
    record: RwLock<GameRecord>,
    clock: Arc<dyn Clock>,
    ledger: Arc<dyn Ledger>,
}

impl Game {
    pub fn new(
        admin: PlayerId,
        config: GameConfig,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self> {
        config.validate()?;

        let id = Uuid::new_v4();
        let record = GameRecord {
            id,
            admin,
            config,
            created_at: clock.now(),
            roster: Vec::new(),
            players: HashMap::new(),
            quorum_reached_at: None,
            finalized: false,
            prize_pool: Amount::ZERO,
            pending_withdrawals: HashMap::new(),
            outcome: None,
        };

        Ok(Self {
            id,
            record: RwLock::new(record),
            clock,
            ledger,
        })
    }

    /// Rebuild a game from a persisted record.
    pub fn restore(
        record: GameRecord,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self> {
        record.config.validate()?;
        record.check_consistency()?;

        Ok(Self {
            id: record.id,
            record: RwLock::new(record),
            clock,
            ledger,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn admin(&self) -> PlayerId {
        self.record.read().admin.clone()
    }

    pub fn config(&self) -> GameConfig {
        self.record.read().config.clone()
    }

    pub fn snapshot(&self) -> GameRecord {
        self.record.read().clone()
    }

    pub fn phase(&self) -> Phase {
        let now = self.clock.now();
        self.record.read().phase(now)
    }

    /// Commit/reveal window boundaries, once quorum has been reached.
    pub fn schedule(&self) -> Option<Schedule> {
        self.record.read().schedule()
    }

    /// Seconds left in the running window, `None` when no timed window runs.
    pub fn time_remaining(&self) -> Option<u64> {
        let now = self.clock.now();
        self.record.read().time_remaining(now)
    }

    pub fn player_count(&self) -> usize {
        self.record.read().roster.len()
    }

    pub fn roster(&self) -> Vec<PlayerId> {
        self.record.read().roster.clone()
    }

    pub fn player_status(&self, player: &PlayerId) -> Option<PlayerStatus> {
        self.record.read().players.get(player).map(Player::status)
    }

    /// Status of every joined player in roster order.
    pub fn players(&self) -> Vec<PlayerStatus> {
        let record = self.record.read();
        record
            .roster
            .iter()
            .filter_map(|id| record.players.get(id))
            .map(Player::status)
            .collect()
    }

    pub fn prize_pool(&self) -> Amount {
        self.record.read().prize_pool
    }

    pub fn pending_withdrawal(&self, player: &PlayerId) -> Amount {
        self.record
            .read()
            .pending_withdrawals
            .get(player)
            .copied()
            .unwrap_or_default()
    }

    /// Final results; rejected until the game has ended.
    pub fn results(&self) -> Result<Outcome> {
        let now = self.clock.now();
        let record = self.record.read();

        match (record.phase(now), &record.outcome) {
            (Phase::Ended, Some(outcome)) => Ok(outcome.clone()),
            (phase, _) => Err(GameError::ResultsNotReady(phase)),
        }
    }

    /// Join with a stake equal to the entry fee.
    pub fn join(&self, caller: &PlayerId, stake: Amount) -> Result<()> {
        let now = self.clock.now();
        let mut record = self.record.write();

        let phase = record.phase(now);
        if !matches!(phase, Phase::WaitingForPlayers | Phase::GameStarting) {
            return Err(GameError::wrong_phase("join", phase));
        }

        if record.players.contains_key(caller) {
            return Err(GameError::AlreadyJoined);
        }

        if record.roster.len() >= record.config.max_players {
            return Err(GameError::GameFull);
        }

        if stake != record.config.entry_fee {
            return Err(GameError::WrongStake {
                expected: record.config.entry_fee.to_units(),
                supplied: stake.to_units(),
            });
        }

        let prize_pool = record.prize_pool.checked_add(stake)?;
        if !stake.is_zero() {
            self.ledger.stake(caller, stake)?;
        }

        record.players.insert(caller.clone(), Player::new(caller.clone(), now));
        record.roster.push(caller.clone());
        record.prize_pool = prize_pool;

        tracing::info!(
            "Player {} joined game {} ({}/{})",
            caller,
            self.id,
            record.roster.len(),
            record.config.max_players
        );

        if record.quorum_reached_at.is_none() && record.roster.len() >= record.config.min_players
        {
            record.quorum_reached_at = Some(now);
            tracing::info!(
                "Game {} reached quorum, commits open at {}",
                self.id,
                now.saturating_add(record.config.auto_start_delay)
            );
        }

        Ok(())
    }

    /// Leave before quorum; the stake is credited back for withdrawal.
    pub fn leave(&self, caller: &PlayerId) -> Result<Amount> {
        let now = self.clock.now();
        let mut record = self.record.write();

        record.require_phase("leave", Phase::WaitingForPlayers, now)?;

        let index = record
            .roster
            .iter()
            .position(|id| id == caller)
            .ok_or(GameError::NotAPlayer)?;

        let refund = record.config.entry_fee;
        let prize_pool = record.prize_pool.checked_sub(refund)?;
        let mut pending = record.pending_withdrawals.clone();
        GameRecord::credit(&mut pending, caller, refund)?;

        record.roster.swap_remove(index);
        record.players.remove(caller);
        record.prize_pool = prize_pool;
        record.pending_withdrawals = pending;

        tracing::info!("Player {} left game {}, refund {}", caller, self.id, refund);
        Ok(refund)
    }

    pub fn commit(&self, caller: &PlayerId, commitment: Commitment) -> Result<()> {
        let now = self.clock.now();
        let mut record = self.record.write();

        record.require_phase("commit", Phase::Commit, now)?;

        let player = record
            .players
            .get_mut(caller)
            .ok_or(GameError::NotAPlayer)?;
        player.submit_commitment(commitment)?;

        tracing::info!("Player {} committed in game {}", caller, self.id);
        Ok(())
    }

    pub fn reveal(&self, caller: &PlayerId, guess: u32, salt: &Salt) -> Result<()> {
        let now = self.clock.now();
        let mut record = self.record.write();

        record.require_phase("reveal", Phase::Reveal, now)?;

        let player = record
            .players
            .get_mut(caller)
            .ok_or(GameError::NotAPlayer)?;
        player.reveal(guess, salt)?;

        tracing::info!("Player {} revealed in game {}", caller, self.id);
        Ok(())
    }

    /// Settle the round. Repeat calls return the stored outcome unchanged.
    pub fn finalize(&self) -> Result<Outcome> {
        let now = self.clock.now();
        let mut record = self.record.write();

        if record.finalized {
            if let Some(outcome) = &record.outcome {
                tracing::debug!("Game {} already finalized", self.id);
                return Ok(outcome.clone());
            }
        }

        record.require_phase("finalize", Phase::Evaluating, now)?;

        let revealed: Vec<(PlayerId, u32)> = record
            .roster
            .iter()
            .filter_map(|id| record.players.get(id))
            .filter_map(|player| player.revealed_guess().map(|g| (player.id().clone(), g)))
            .collect();

        let entropy = tie_break_entropy(self.id, now, &record);
        let outcome = resolve(
            &revealed,
            record.prize_pool,
            record.config.service_fee_percent,
            &record.admin,
            &entropy,
            now,
        );

        let mut pending = record.pending_withdrawals.clone();
        GameRecord::credit(&mut pending, &record.admin, outcome.service_fee)?;
        GameRecord::credit(&mut pending, &outcome.winner, outcome.winner_prize)?;

        record.pending_withdrawals = pending;
        record.outcome = Some(outcome.clone());
        record.finalized = true;

        if outcome.is_forfeit() {
            tracing::warn!(
                "Game {} finalized with no reveals, {} forfeited to {}",
                self.id,
                outcome.prize_pool,
                outcome.winner
            );
        } else {
            tracing::info!(
                "Game {} finalized. Average {}, target {}, winner {} ({} prize, {} fee)",
                self.id,
                outcome.average,
                outcome.target,
                outcome.winner,
                outcome.winner_prize,
                outcome.service_fee
            );
        }

        Ok(outcome)
    }

    /// Pull the caller's whole pending balance out through the ledger.
    pub fn withdraw(&self, caller: &PlayerId) -> Result<Amount> {
        let mut record = self.record.write();

        let amount = record
            .pending_withdrawals
            .get(caller)
            .copied()
            .unwrap_or_default();
        if amount.is_zero() {
            return Err(GameError::NoFunds);
        }

        // balance is zeroed before the transfer is attempted
        record.pending_withdrawals.remove(caller);
        if let Err(e) = self.ledger.transfer(caller, amount) {
            record.pending_withdrawals.insert(caller.clone(), amount);
            tracing::warn!("Withdrawal of {} for {} failed: {}", amount, caller, e);
            return Err(e.into());
        }

        tracing::info!("Player {} withdrew {} from game {}", caller, amount, self.id);
        Ok(amount)
    }

    pub fn info(&self) -> GameInfo {
        let now = self.clock.now();
        let record = self.record.read();

        GameInfo {
            id: self.id,
            admin: record.admin.clone(),
            phase: record.phase(now),
            config: record.config.clone(),
            player_count: record.roster.len(),
            prize_pool: record.prize_pool,
            schedule: record.schedule(),
            time_remaining: record.time_remaining(now),
            winner: record.outcome.as_ref().map(|o| o.winner.clone()),
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let record = self.record.read();
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("players", &record.roster.len())
            .field("prize_pool", &record.prize_pool)
            .field("finalized", &record.finalized)
            .finish()
    }
}

/// Weak entropy: game id, finalization second and roster data.
fn tie_break_entropy(id: GameId, now: u64, record: &GameRecord) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(now.to_be_bytes());
    hasher.update((record.roster.len() as u64).to_be_bytes());
    hasher.update(record.prize_pool.to_units().to_be_bytes());
    hasher.finalize().into()
}

/// Game info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    pub admin: PlayerId,
    pub phase: Phase,
    pub config: GameConfig,
    pub player_count: usize,
    pub prize_pool: Amount,
    pub schedule: Option<Schedule>,
    pub time_remaining: Option<u64>,
    pub winner: Option<PlayerId>,
}
