//! Solana primitives for wrapping SOL and building exact-scheme payments
//!
//! This module covers only what the wrap workflow and the exact SVM payment scheme
//! need: base58 keys, Solana CLI keypairs, program-derived addresses, the handful
//! of native program instructions, v0 transaction messages and JSON-RPC access.
//!
//! # Architecture
//!
//! - [`pubkey`] - Addresses, signatures, blockhashes and program-derived addresses
//! - [`keypair`] - Ed25519 signing identity loaded from a keypair file
//! - [`instruction`] - System, SPL token, associated token and compute budget instructions
//! - [`transaction`] - Message compilation, signing and base64 wire encoding
//! - [`rpc`] - The [`SolanaRpc`] trait and its JSON-RPC implementation
//!
//! # Examples
//!
//! ```no_run
//! use deep_thought_x402::solana::{
//!     instruction::{system, NATIVE_MINT},
//!     Keypair, Message, RpcClient, SolanaRpc, Transaction,
//! };
//!
//! # async fn example() -> deep_thought_x402::Result<()> {
//! let rpc = RpcClient::new("https://api.devnet.solana.com")?;
//! let payer = Keypair::read_from_file("/home/me/.config/solana/id.json")?;
//!
//! let blockhash = rpc.get_latest_blockhash().await?;
//! let ix = system::transfer(&payer.pubkey(), &NATIVE_MINT, 1);
//! let mut tx = Transaction::new_unsigned(Message::compile(&payer.pubkey(), &[ix], blockhash)?);
//! tx.sign(&[&payer])?;
//! let signature = rpc.send_transaction(&tx).await?;
//! # Ok(())
//! # }
//! ```

pub mod instruction;
pub mod keypair;
pub mod pubkey;
pub mod rpc;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use instruction::{AccountMeta, Instruction};
pub use keypair::Keypair;
pub use pubkey::{Hash, Pubkey, Signature};
pub use rpc::{AccountInfo, ConfirmationStatus, RpcClient, SolanaRpc};
pub use transaction::{Message, Transaction};
