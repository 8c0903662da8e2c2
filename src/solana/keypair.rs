//! Ed25519 signing identity in the Solana CLI keypair file format

use super::pubkey::{Pubkey, Signature};
use crate::{Result, X402Error};
use ed25519_dalek::{Signer, SigningKey};
use std::fmt;
use std::path::Path;

/// Secret and public key pair backing a wallet
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Build from a 32-byte secret seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build from the 64-byte `secret || public` layout used by `solana-keygen`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 64] = bytes.try_into().map_err(|_| {
            X402Error::invalid_key(format!("keypair must be 64 bytes, got {}", bytes.len()))
        })?;
        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| X402Error::invalid_key(format!("public key does not match secret: {}", e)))?;
        Ok(Self { signing_key })
    }

    /// Read a keypair file containing a JSON array of 64 byte values
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            X402Error::config(format!("Failed to read keypair {}: {}", path.display(), e))
        })?;
        let bytes: Vec<u8> = serde_json::from_str(&contents).map_err(|e| {
            X402Error::invalid_key(format!("Keypair {} is not a JSON byte array: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new_from_array(self.signing_key.sign(message).to_bytes())
    }

    /// The 64-byte file representation
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}
