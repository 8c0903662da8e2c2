//! Core types for the x402 protocol
//!
//! This module defines the version 2 wire types exchanged between the paying
//! client, the resource server and the facilitator, plus Solana network and asset
//! constants.
//!
//! # Architecture
//!
//! - [`network`] - Solana cluster selection and CAIP-2 identifiers
//! - [`payment`] - Payment requirements, challenges and payloads
//! - [`facilitator`] - Facilitator configuration and response types
//! - [`constants`] - Protocol constants (networks, schemes, assets, header names)
//!
//! # Examples
//!
//! ## Creating Payment Requirements
//!
//! ```
//! use deep_thought_x402::types::{assets, networks, schemes, PaymentRequirements};
//!
//! let mut requirements = PaymentRequirements::new(
//!     schemes::EXACT,
//!     networks::SOLANA_MAINNET,
//!     "4200000",                                      // 0.0042 WSOL
//!     assets::WSOL_MINT,
//!     "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", // recipient
//! );
//! requirements.set_fee_payer("2wKupLR9q6wXYppw8Gr2NvWxKBUqm4PPJKkQfoxHDBg4");
//! assert_eq!(requirements.amount_as_u64().unwrap(), 4_200_000);
//! ```
//!
//! ## Network Configuration
//!
//! ```
//! use deep_thought_x402::types::Network;
//!
//! let network: Network = "devnet".parse().unwrap();
//! assert_eq!(network.as_str(), "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1");
//! ```

pub mod constants;
pub mod facilitator;
pub mod network;
pub mod payment;

// Re-export commonly used types
pub use constants::{assets, headers, networks, schemes};
pub use facilitator::{
    FacilitatorConfig, SettleResponse, SupportedKind, SupportedKinds, VerifyResponse,
};
pub use network::Network;
pub use payment::{
    PaymentPayload, PaymentRequired, PaymentRequirements, ResourceInfo, X402_VERSION,
};
