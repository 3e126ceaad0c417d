//! Thirds core - collaborators for the two-thirds guessing game
//!
//! Identity and amount types, the fund custody contract the game settles
//! against, and the clock the game derives its phases from.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use ledger::{Ledger, LedgerSnapshot, MemoryLedger};
pub use types::{Amount, Balance, PlayerId};
