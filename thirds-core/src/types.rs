use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque caller identity handed to us by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value in the smallest currency unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn to_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Result<Amount> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(CoreError::Overflow)
    }

    pub fn checked_sub(self, rhs: Amount) -> Result<Amount> {
        self.0.checked_sub(rhs.0).map(Amount).ok_or_else(|| {
            CoreError::InsufficientFunds {
                need: rhs.0,
                available: self.0,
            }
        })
    }

    /// `floor(self * percent / 100)`, computed without intermediate overflow.
    pub fn percent_floor(self, percent: u8) -> Amount {
        let scaled = u128::from(self.0) * u128::from(percent) / 100;
        // only exceeds u64 when percent > 100
        Amount(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} units", self.0)
    }
}

/// Balance held by the custody layer for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub available: Amount,
    pub staked: Amount,
    pub total: Amount,
}

impl Balance {
    pub fn new(available: Amount, staked: Amount) -> Self {
        Self {
            available,
            staked,
            total: Amount(available.0.saturating_add(staked.0)),
        }
    }
}
