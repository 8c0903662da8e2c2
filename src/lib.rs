//! # Deep Thought over x402
//!
//! A pay-per-request "meaning of life" endpoint and the Solana client that pays for it,
//! speaking version 2 of the x402 HTTP-native micropayment protocol.
//!
//! ## Features
//!
//! - **Paid route**: `GET /meaning-of-life` answers only after an `exact` payment of
//!   0.0042 WSOL has been verified and settled by a facilitator
//! - **Free route**: `GET /health` echoes network, payee and price
//! - **Paying client**: checks the WSOL balance, wraps SOL when short, waits for
//!   confirmation and retries the 402 with a signed transfer
//! - **Solana without an SDK**: keys, v0 messages, SPL token instructions and JSON-RPC
//!   on top of `ed25519-dalek`, `bs58`, `sha2` and `reqwest`
//!
//! ## Quick Start
//!
//! ### Serving the answer
//!
//! ```rust,no_run
//! use deep_thought_x402::{config::ServerConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     println!("{}", server::banner(&config));
//!
//!     let listener = server::bind(&config).await?;
//!     let app = server::build_app(config).await?;
//!     server::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Asking for it
//!
//! ```rust,no_run
//! use deep_thought_x402::{
//!     client::X402Client,
//!     scheme::{register_exact_svm, SchemeRegistry},
//!     solana::{Keypair, RpcClient},
//!     wallet::Wallet,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let keypair = Arc::new(Keypair::read_from_file("/home/arthur/.config/solana/id.json")?);
//!     let rpc = Arc::new(RpcClient::new("https://api.mainnet-beta.solana.com")?);
//!
//!     let wallet = Wallet::new(keypair.clone(), rpc.clone());
//!     wallet.ensure_balance(4_200_000, 5_000_000).await?;
//!
//!     let mut registry = SchemeRegistry::new();
//!     register_exact_svm(&mut registry, keypair, rpc);
//!
//!     let response = X402Client::new(registry)
//!         .get("http://localhost:4021/meaning-of-life")
//!         .await?;
//!     println!("{}", String::from_utf8_lossy(response.body()));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: x402 v2 wire types and protocol constants
//! - **`facilitator`**: HTTP client for `/verify`, `/settle` and `/supported`
//! - **`scheme`**: client and server halves of the `exact` SVM scheme
//! - **`client`**: transport decorator that answers 402 challenges
//! - **`middleware`**: Axum payment gate
//! - **`server`**: the Deep Thought router, banner and listener
//! - **`solana`**: keys, transactions and JSON-RPC
//! - **`wallet`**: WSOL balance, wrapping and confirmation polling
//! - **`config`**: environment driven settings for both binaries
//! - **`error`**: the crate error type
//!
//! ## Optional Features
//!
//! - **`axum`**: the payment middleware and the resource server (default)

pub mod client;
pub mod config;
pub mod error;
pub mod facilitator;
pub mod scheme;
pub mod solana;
pub mod types;
pub mod wallet;

// Feature-gated framework support
#[cfg(feature = "axum")]
pub mod middleware;

#[cfg(feature = "axum")]
pub mod server;

// Re-exports for convenience
pub use client::X402Client;
pub use error::{Result, X402Error};
pub use types::*;
pub use wallet::Wallet;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
