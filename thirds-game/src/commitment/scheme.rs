use crate::error::{GameError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const COMMITMENT_LEN: usize = 32;
pub const SALT_LEN: usize = 32;

/// Trait for commitment schemes binding a guess to a secret salt
pub trait CommitmentScheme {
    fn commit(guess: u32, salt: &Salt) -> Commitment;

    fn verify(commitment: &Commitment, guess: u32, salt: &Salt) -> bool {
        Self::commit(guess, salt) == *commitment
    }
}

/// Opaque 32-byte commitment as stored by the game.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; COMMITMENT_LEN]);

/// Caller-chosen secret mixed into a commitment.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

macro_rules! fixed_bytes {
    ($name:ident, $len:expr, $what:literal) => {
        impl $name {
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self> {
                let raw = hex::decode(s.trim().trim_start_matches("0x")).map_err(|e| {
                    GameError::InvalidEncoding(format!("{} is not valid hex: {}", $what, e))
                })?;
                let bytes: [u8; $len] = raw.as_slice().try_into().map_err(|_| {
                    GameError::InvalidEncoding(format!(
                        "{} must be {} bytes, got {}",
                        $what,
                        $len,
                        raw.len()
                    ))
                })?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(Commitment, COMMITMENT_LEN, "commitment");
fixed_bytes!(Salt, SALT_LEN, "salt");

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(..)")
    }
}
