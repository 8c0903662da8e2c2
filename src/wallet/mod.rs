//! Client-side WSOL wallet: balance gate and wrap top-up
//!
//! # Architecture
//!
//! - [`Wallet`] - A keypair bound to an RPC endpoint and a poll policy
//! - [`funding`] - The wrap transaction and its submit/confirm workflow
//! - [`poll`] - [`PollPolicy`] and the [`Sleeper`] seam used while waiting
//!
//! # Examples
//!
//! ```no_run
//! use deep_thought_x402::solana::{Keypair, RpcClient};
//! use deep_thought_x402::wallet::Wallet;
//! use std::sync::Arc;
//!
//! # async fn example() -> deep_thought_x402::Result<()> {
//! let keypair = Arc::new(Keypair::read_from_file("/home/arthur/.config/solana/id.json")?);
//! let rpc = Arc::new(RpcClient::new("https://api.mainnet-beta.solana.com")?);
//! let wallet = Wallet::new(keypair, rpc);
//!
//! if let Some(signature) = wallet.ensure_balance(4_200_000, 5_000_000).await? {
//!     println!("wrapped in {}", signature);
//! }
//! # Ok(())
//! # }
//! ```

pub mod funding;
pub mod poll;

pub use funding::{wrap_instructions, wrap_sol};
pub use poll::{wait_for_confirmation, PollPolicy, Sleeper, TokioSleeper};

use crate::solana::instruction::{associated_token, NATIVE_MINT, TOKEN_PROGRAM_ID};
use crate::solana::{Keypair, Pubkey, Signature, SolanaRpc};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Token balance held at `owner`'s associated account for `mint`.
///
/// Any failure (underivable address, missing account, RPC error, unexpected data)
/// reads as a zero balance.
pub async fn token_balance(
    rpc: &dyn SolanaRpc,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> u64 {
    let ata = match associated_token::get_associated_token_address(owner, mint, token_program) {
        Ok(ata) => ata,
        Err(e) => {
            debug!(%owner, error = %e, "Cannot derive token account");
            return 0;
        }
    };

    match rpc.get_account_info(&ata).await {
        Ok(Some(account)) => account.token_amount().unwrap_or_default(),
        Ok(None) => 0,
        Err(e) => {
            debug!(%ata, error = %e, "Token balance lookup failed");
            0
        }
    }
}

/// WSOL balance in lamports
pub async fn wsol_balance(rpc: &dyn SolanaRpc, owner: &Pubkey) -> u64 {
    token_balance(rpc, owner, &NATIVE_MINT, &TOKEN_PROGRAM_ID).await
}

/// A paying identity with chain access
#[derive(Clone)]
pub struct Wallet {
    keypair: Arc<Keypair>,
    rpc: Arc<dyn SolanaRpc>,
    policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.keypair.pubkey())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Wallet {
    pub fn new(keypair: Arc<Keypair>, rpc: Arc<dyn SolanaRpc>) -> Self {
        Self {
            keypair,
            rpc,
            policy: PollPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Set the confirmation poll policy
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the sleeper used between polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Arc<Keypair> {
        &self.keypair
    }

    pub fn rpc(&self) -> &Arc<dyn SolanaRpc> {
        &self.rpc
    }

    /// Current WSOL balance, zero when it cannot be read
    pub async fn balance(&self) -> u64 {
        wsol_balance(self.rpc.as_ref(), &self.pubkey()).await
    }

    /// Wrap `lamports` of SOL and wait for confirmation
    pub async fn wrap(&self, lamports: u64) -> Result<Signature> {
        wrap_sol(
            self.rpc.as_ref(),
            &self.keypair,
            lamports,
            &self.policy,
            self.sleeper.as_ref(),
        )
        .await
    }

    /// Wrap `wrap_amount` when the balance is below `required`.
    ///
    /// Returns the wrap signature, or `None` when the balance already suffices.
    pub async fn ensure_balance(&self, required: u64, wrap_amount: u64) -> Result<Option<Signature>> {
        let balance = self.balance().await;
        if balance >= required {
            debug!(balance, required, "WSOL balance sufficient");
            return Ok(None);
        }

        info!(balance, required, wrap_amount, "Insufficient WSOL, wrapping");
        self.wrap(wrap_amount).await.map(Some)
    }
}
