//! Base58 account addresses, transaction signatures and blockhashes

use crate::{Result, X402Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
const MAX_SEED_LEN: usize = 32;

macro_rules! base58_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length in bytes
            pub const LEN: usize = $len;

            pub const fn new_from_array(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn to_bytes(&self) -> [u8; $len] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| {
                    X402Error::invalid_key(format!(
                        "{} must be {} bytes, got {}",
                        $label,
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok(Self(array))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl FromStr for $name {
            type Err = X402Error;

            fn from_str(s: &str) -> Result<Self> {
                let bytes = bs58::decode(s).into_vec().map_err(|e| {
                    X402Error::invalid_key(format!("invalid base58 {} '{}': {}", $label, s, e))
                })?;
                Self::try_from_slice(&bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

base58_bytes!(
    /// A Solana account address
    Pubkey,
    32,
    "address"
);

base58_bytes!(
    /// An ed25519 transaction signature, also the transaction identifier
    Signature,
    64,
    "signature"
);

base58_bytes!(
    /// A recent blockhash bounding the lifetime of a transaction
    Hash,
    32,
    "blockhash"
);

impl Pubkey {
    /// Whether the bytes decompress to an ed25519 curve point
    pub fn is_on_curve(&self) -> bool {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0).is_ok()
    }

    /// Find the canonical program-derived address for `seeds`, searching bumps from 255 down
    pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
        if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
            return Err(X402Error::invalid_key(format!(
                "seed of {} bytes exceeds the {} byte limit",
                seed.len(),
                MAX_SEED_LEN
            )));
        }

        for bump in (0..=u8::MAX).rev() {
            if let Some(address) = Self::create_program_address(seeds, bump, program_id) {
                return Ok((address, bump));
            }
        }

        Err(X402Error::invalid_key(
            "no viable bump seed for program address",
        ))
    }

    fn create_program_address(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Option<Pubkey> {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update([bump]);
        hasher.update(program_id.0);
        hasher.update(PDA_MARKER);

        let candidate = Pubkey(hasher.finalize().into());
        // Valid PDAs must not have a corresponding private key
        (!candidate.is_on_curve()).then_some(candidate)
    }
}
