//! Confirmation polling for submitted transactions

use crate::solana::{Signature, SolanaRpc};
use crate::{Result, X402Error};
use std::time::Duration;
use tracing::debug;

/// Source of the pause between status checks
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How often and how long to wait for a transaction to land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total number of status checks
    pub max_attempts: u32,
    /// Pause between consecutive checks
    pub interval: Duration,
    /// Upper bound of the random extra pause added to each interval
    pub jitter: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Pause before the next check, in `[interval, interval + jitter]`
    pub fn delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        let extra = rand::random::<u64>() % (jitter_ms + 1);
        self.interval.saturating_add(Duration::from_millis(extra))
    }
}

impl Default for PollPolicy {
    /// 30 checks one second apart
    fn default() -> Self {
        Self::new(30, Duration::from_secs(1))
    }
}

/// Poll the signature status until it is `confirmed` or `finalized`.
///
/// Performs at most `policy.max_attempts` checks and never sleeps after the last
/// one. RPC errors end the wait immediately.
pub async fn wait_for_confirmation(
    rpc: &dyn SolanaRpc,
    signature: &Signature,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<()> {
    for attempt in 1..=policy.max_attempts {
        let status = rpc.get_signature_status(signature).await?;
        debug!(%signature, attempt, ?status, "Signature status");

        if status.is_confirmed() {
            return Ok(());
        }

        if attempt < policy.max_attempts {
            sleeper.sleep(policy.delay()).await;
        }
    }

    Err(X402Error::ConfirmationTimeout {
        signature: signature.to_string(),
        attempts: policy.max_attempts,
    })
}
