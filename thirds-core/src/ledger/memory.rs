use crate::error::{CoreError, Result};
use crate::ledger::Ledger;
use crate::types::{Amount, Balance, PlayerId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: HashMap<PlayerId, Amount>,
    pub staked: HashMap<PlayerId, Amount>,
    pub escrow: Amount,
}

/// In-process ledger keeping account balances and a single custody pool.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerSnapshot>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().clone()
    }

    /// Mint `amount` into an account, creating it if needed.
    pub fn fund(&self, account: &PlayerId, amount: Amount) -> Result<Amount> {
        let mut state = self.state.write();
        let current = state.accounts.get(account).copied().unwrap_or_default();
        let updated = current.checked_add(amount)?;
        state.accounts.insert(account.clone(), updated);

        tracing::info!("Funded account {} with {}", account, amount);
        Ok(updated)
    }

    pub fn balance(&self, account: &PlayerId) -> Balance {
        let state = self.state.read();
        Balance::new(
            state.accounts.get(account).copied().unwrap_or_default(),
            state.staked.get(account).copied().unwrap_or_default(),
        )
    }

    pub fn escrow(&self) -> Amount {
        self.state.read().escrow
    }
}

impl Ledger for MemoryLedger {
    fn stake(&self, from: &PlayerId, amount: Amount) -> Result<()> {
        let mut state = self.state.write();
        let available = *state
            .accounts
            .get(from)
            .ok_or_else(|| CoreError::AccountNotFound(from.clone()))?;

        let remaining = available.checked_sub(amount)?;
        let escrow = state.escrow.checked_add(amount)?;
        let staked = state
            .staked
            .get(from)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)?;

        state.accounts.insert(from.clone(), remaining);
        state.staked.insert(from.clone(), staked);
        state.escrow = escrow;

        tracing::debug!("Account {} staked {}", from, amount);
        Ok(())
    }

    fn transfer(&self, to: &PlayerId, amount: Amount) -> Result<()> {
        let mut state = self.state.write();
        let escrow = state.escrow.checked_sub(amount).map_err(|_| {
            CoreError::ledger(format!(
                "custody holds {} but {} was requested",
                state.escrow, amount
            ))
        })?;
        let current = state.accounts.get(to).copied().unwrap_or_default();
        let updated = current.checked_add(amount)?;

        state.escrow = escrow;
        state.accounts.insert(to.clone(), updated);

        tracing::debug!("Transferred {} to account {}", amount, to);
        Ok(())
    }
}
