//! Result resolution for a finished round.
//!
//! Ties are broken with a weak, caller-observable pseudo-random index derived
//! from time and roster data at finalization. Anyone able to pick the
//! finalization second can steer a tie; stakes are assumed small enough for
//! this to be acceptable. Unpredictable selection would need a verifiable
//! randomness collaborator supplying the entropy instead.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thirds_core::{Amount, PlayerId};

/// Final results, written once at finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// `floor(sum / count)` over revealed guesses, 0 when nobody revealed.
    pub average: u32,
    /// `floor(average * 2 / 3)`, 0 when nobody revealed.
    pub target: u32,
    pub winner: PlayerId,
    pub reveal_count: usize,
    /// Players at the minimum distance from the target, in roster order.
    pub tied: Vec<PlayerId>,
    pub prize_pool: Amount,
    pub winner_prize: Amount,
    pub service_fee: Amount,
    pub finalized_at: u64,
}

impl Outcome {
    pub fn is_forfeit(&self) -> bool {
        self.reveal_count == 0
    }
}

/// Compute the outcome from the revealed guesses (in roster order).
pub fn resolve(
    revealed: &[(PlayerId, u32)],
    prize_pool: Amount,
    service_fee_percent: u8,
    admin: &PlayerId,
    entropy: &[u8; 32],
    finalized_at: u64,
) -> Outcome {
    if revealed.is_empty() {
        return Outcome {
            average: 0,
            target: 0,
            winner: admin.clone(),
            reveal_count: 0,
            tied: Vec::new(),
            prize_pool,
            winner_prize: prize_pool,
            service_fee: Amount::ZERO,
            finalized_at,
        };
    }

    let count = revealed.len() as u64;
    let sum: u64 = revealed.iter().map(|(_, guess)| u64::from(*guess)).sum();
    // guesses are capped at 1000, so the average always fits
    let average = (sum / count) as u32;
    let target = average * 2 / 3;

    let best = revealed
        .iter()
        .map(|(_, guess)| guess.abs_diff(target))
        .min()
        .unwrap_or(0);
    let tied: Vec<PlayerId> = revealed
        .iter()
        .filter(|(_, guess)| guess.abs_diff(target) == best)
        .map(|(id, _)| id.clone())
        .collect();

    let winner = if tied.len() == 1 {
        tied[0].clone()
    } else {
        tied[tie_break_index(entropy, tied.len())].clone()
    };

    // a fee above 100% would exceed the pool
    let service_fee = prize_pool.percent_floor(service_fee_percent.min(100));
    let winner_prize =
        Amount::from_units(prize_pool.to_units().saturating_sub(service_fee.to_units()));

    Outcome {
        average,
        target,
        winner,
        reveal_count: revealed.len(),
        tied,
        prize_pool,
        winner_prize,
        service_fee,
        finalized_at,
    }
}

/// Index in `0..tie_count` picked from `entropy` mixed with the tie count.
pub fn tie_break_index(entropy: &[u8; 32], tie_count: usize) -> usize {
    if tie_count <= 1 {
        return 0;
    }

    let mut hasher = Sha256::new();
    hasher.update(entropy);
    hasher.update((tie_count as u64).to_be_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % tie_count as u64) as usize
}
