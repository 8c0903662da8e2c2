//! Network configuration types

use super::constants::networks;
use crate::{Result, X402Error};
use std::fmt;
use std::str::FromStr;

/// Solana cluster a payment settles on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Devnet,
    Testnet,
}

impl Network {
    /// CAIP-2 identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => networks::SOLANA_MAINNET,
            Network::Devnet => networks::SOLANA_DEVNET,
            Network::Testnet => networks::SOLANA_TESTNET,
        }
    }

    /// Human readable cluster name
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Solana Mainnet",
            Network::Devnet => "Solana Devnet",
            Network::Testnet => "Solana Testnet",
        }
    }

    /// Public RPC endpoint for the cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Solscan link for a transaction
    pub fn explorer_tx_url(&self, transaction: &str) -> String {
        match self {
            Network::Mainnet => format!("https://solscan.io/tx/{}", transaction),
            Network::Devnet => format!("https://solscan.io/tx/{}?cluster=devnet", transaction),
            Network::Testnet => format!("https://solscan.io/tx/{}?cluster=testnet", transaction),
        }
    }
}

impl FromStr for Network {
    type Err = X402Error;

    /// Accepts CAIP-2 identifiers and the short cluster names
    fn from_str(s: &str) -> Result<Self> {
        match s {
            networks::SOLANA_MAINNET | "mainnet" | "mainnet-beta" | "solana" => Ok(Network::Mainnet),
            networks::SOLANA_DEVNET | "devnet" | "solana-devnet" => Ok(Network::Devnet),
            networks::SOLANA_TESTNET | "testnet" => Ok(Network::Testnet),
            other => Err(X402Error::NetworkNotSupported {
                network: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
