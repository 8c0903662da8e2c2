//! Payment schemes
//!
//! A scheme decides what a payment looks like on a given network. Each side keeps
//! its own registry keyed by scheme name and a CAIP-2 network pattern:
//!
//! - [`client`] - [`SchemeClient`] and the [`SchemeRegistry`] used to answer 402 challenges
//! - [`server`] - [`SchemeServer`] and the [`ResourceServer`] that talks to the facilitator
//! - [`exact_svm`] - The `exact` scheme on Solana for both sides
//!
//! # Examples
//!
//! ```no_run
//! use deep_thought_x402::facilitator::FacilitatorClient;
//! use deep_thought_x402::scheme::{register_exact_svm, register_exact_svm_server, ResourceServer, SchemeRegistry};
//! use deep_thought_x402::solana::{Keypair, RpcClient};
//! use deep_thought_x402::types::FacilitatorConfig;
//! use std::sync::Arc;
//!
//! # fn example() -> deep_thought_x402::Result<()> {
//! // paying side
//! let signer = Arc::new(Keypair::from_seed(&[1u8; 32]));
//! let rpc = Arc::new(RpcClient::new("https://api.mainnet-beta.solana.com")?);
//! let mut registry = SchemeRegistry::new();
//! register_exact_svm(&mut registry, signer, rpc);
//!
//! // selling side
//! let facilitator = FacilitatorClient::new(FacilitatorConfig::default())?;
//! let resource_server = register_exact_svm_server(ResourceServer::new(facilitator));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod exact_svm;
pub mod server;

pub use client::{SchemeClient, SchemeRegistry};
pub use exact_svm::{
    register_exact_svm, register_exact_svm_server, ExactSvmClient, ExactSvmServerScheme,
};
pub use server::{ResourceServer, SchemeServer};
