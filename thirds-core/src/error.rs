use crate::types::PlayerId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Insufficient funds: need {need} units, have {available} units")]
    InsufficientFunds { need: u64, available: u64 },

    #[error("Account not found: {0}")]
    AccountNotFound(PlayerId),

    #[error("Amount overflow")]
    Overflow,
}

impl CoreError {
    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }
}
