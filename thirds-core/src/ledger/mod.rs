pub mod memory;

pub use memory::{LedgerSnapshot, MemoryLedger};

use crate::error::Result;
use crate::types::{Amount, PlayerId};

/// Fund custody collaborator.
///
/// Stakes move caller funds into custody; transfers release custody funds to
/// an account and are only ever initiated by the recipient (pull payments).
/// Both calls are all-or-nothing: an `Err` means nothing moved.
pub trait Ledger: Send + Sync {
    /// Take exactly `amount` from `from` into custody.
    fn stake(&self, from: &PlayerId, amount: Amount) -> Result<()>;

    /// Release `amount` from custody to `to`.
    fn transfer(&self, to: &PlayerId, amount: Amount) -> Result<()>;
}
