//! Process configuration for the resource server and the paying client
//!
//! Both binaries read their settings once at startup into immutable structs. The
//! `from_lookup` constructors take any key lookup so tests never touch the real
//! process environment.

use crate::facilitator::DEFAULT_FACILITATOR_URL;
use crate::solana::rpc::DEFAULT_RPC_URL;
use crate::solana::Pubkey;
use crate::types::Network;
use crate::{Result, X402Error};
use std::path::PathBuf;
use std::time::Duration;

/// Default server port
pub const DEFAULT_PORT: u16 = 4021;
/// Default server URL the client talks to
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4021";
/// Default Solana CLI keypair location
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";
/// Price of one answer in WSOL base units (0.0042 WSOL)
pub const PRICE_AMOUNT: u64 = 4_200_000;
/// Balance the client must hold before paying
pub const REQUIRED_BALANCE: u64 = 4_200_000;
/// Lamports wrapped when the balance is short (0.005 SOL)
pub const WRAP_AMOUNT: u64 = 5_000_000;
/// How long Deep Thought pretends to think
pub const DEFAULT_COMPUTE_DELAY: Duration = Duration::from_secs(4);

/// Resource server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
    /// Wallet that receives payments
    pub payee: Pubkey,
    /// Facilitator base URL
    pub facilitator_url: String,
    /// Network payments settle on
    pub network: Network,
    /// Price in WSOL base units
    pub amount: u64,
    /// Artificial delay before the answer is returned
    pub compute_delay: Duration,
}

impl ServerConfig {
    /// Read `PORT`, `SVM_PAYEE_ADDRESS` and `FACILITATOR_URL` from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let payee = lookup("SVM_PAYEE_ADDRESS")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| X402Error::config("SVM_PAYEE_ADDRESS environment variable is required"))?;
        let payee: Pubkey = payee.trim().parse().map_err(|e| {
            X402Error::config(format!("SVM_PAYEE_ADDRESS is not a valid address: {}", e))
        })?;

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| X402Error::config(format!("PORT must be a number, got {}", port)))?,
            None => DEFAULT_PORT,
        };

        let facilitator_url =
            lookup("FACILITATOR_URL").unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_string());

        Ok(Self {
            port,
            payee,
            facilitator_url,
            network: Network::Mainnet,
            amount: PRICE_AMOUNT,
            compute_delay: DEFAULT_COMPUTE_DELAY,
        })
    }

    /// Set the compute delay
    pub fn with_compute_delay(mut self, compute_delay: Duration) -> Self {
        self.compute_delay = compute_delay;
        self
    }

    /// Set the facilitator URL
    pub fn with_facilitator_url(mut self, url: impl Into<String>) -> Self {
        self.facilitator_url = url.into();
        self
    }

    /// Payee shortened to `first8...last6` for the banner
    pub fn payee_abbreviated(&self) -> String {
        abbreviate(&self.payee.to_string())
    }
}

/// Paying client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the resource server
    pub server_url: String,
    /// Solana CLI keypair file
    pub keypair_path: PathBuf,
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,
    /// Minimum WSOL balance before paying
    pub required_balance: u64,
    /// Lamports to wrap when short
    pub wrap_amount: u64,
}

impl ClientConfig {
    /// Read `SERVER_URL`, `KEYPAIR_PATH` and `RPC_URL` from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup("SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let keypair_path = lookup("KEYPAIR_PATH").unwrap_or_else(|| DEFAULT_KEYPAIR_PATH.to_string());
        let keypair_path = expand_home(&keypair_path, lookup("HOME").as_deref());
        let rpc_url = lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            keypair_path,
            rpc_url,
            required_balance: REQUIRED_BALANCE,
            wrap_amount: WRAP_AMOUNT,
        }
    }

    /// Full URL of the metered endpoint
    pub fn meaning_of_life_url(&self) -> String {
        format!("{}/meaning-of-life", self.server_url)
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => PathBuf::from(format!("{}{}", home.unwrap_or_default(), rest)),
        None => PathBuf::from(path),
    }
}

fn abbreviate(value: &str) -> String {
    if value.len() <= 14 {
        return value.to_string();
    }
    format!("{}...{}", &value[..8], &value[value.len() - 6..])
}
