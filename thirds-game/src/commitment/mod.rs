//! Commit-reveal scheme.
//!
//! Canonical encoding shared with clients:
//!
//! ```text
//! commitment = SHA-256( guess as u32 big-endian (4 bytes) || salt (32 bytes) )
//! ```
//!
//! Both values travel as lowercase hex.

pub mod scheme;

pub use scheme::{Commitment, CommitmentScheme, Salt, COMMITMENT_LEN, SALT_LEN};

use rand::RngCore;
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical guess/salt encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Scheme;

impl CommitmentScheme for Sha256Scheme {
    fn commit(guess: u32, salt: &Salt) -> Commitment {
        let mut hasher = Sha256::new();
        hasher.update(guess.to_be_bytes());
        hasher.update(salt.as_bytes());
        Commitment::from_bytes(hasher.finalize().into())
    }
}

/// Rnd salt for a commitment
pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    Salt::from_bytes(salt)
}

/// Commitment for `guess` under the canonical scheme.
pub fn commit(guess: u32, salt: &Salt) -> Commitment {
    Sha256Scheme::commit(guess, salt)
}
