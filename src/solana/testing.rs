//! In-memory chain used by unit tests

use super::pubkey::{Hash, Pubkey, Signature};
use super::rpc::{AccountInfo, ConfirmationStatus, SolanaRpc};
use super::transaction::Transaction;
use crate::{Result, X402Error};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";

/// Scripted [`SolanaRpc`]: accounts are fixed, statuses are replayed in order
#[derive(Default)]
pub(crate) struct FakeRpc {
    pub accounts: HashMap<Pubkey, AccountInfo>,
    /// Statuses returned by successive polls; the last one repeats
    pub statuses: Vec<Result<ConfirmationStatus>>,
    pub fail_account_lookups: bool,
    pub sent: Mutex<Vec<Transaction>>,
    pub polls: Mutex<u32>,
}

impl FakeRpc {
    pub fn with_account(mut self, address: Pubkey, info: AccountInfo) -> Self {
        self.accounts.insert(address, info);
        self
    }

    /// Poll `n` (1-based) is the first to report `confirmed`
    pub fn confirmed_on_poll(mut self, n: u32) -> Self {
        self.statuses = (1..n)
            .map(|_| Ok(ConfirmationStatus::Processed))
            .chain(std::iter::once(Ok(ConfirmationStatus::Confirmed)))
            .collect();
        self
    }

    pub fn never_confirmed(mut self) -> Self {
        self.statuses = vec![Ok(ConfirmationStatus::Unknown)];
        self
    }

    pub fn poll_count(&self) -> u32 {
        *self.polls.lock().unwrap()
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

pub(crate) fn token_account(owner: &Pubkey, amount: u64) -> AccountInfo {
    AccountInfo {
        lamports: 2_039_280 + amount,
        owner: super::instruction::TOKEN_PROGRAM_ID,
        data: json!({
            "program": "spl-token",
            "parsed": {
                "type": "account",
                "info": {
                    "owner": owner.to_string(),
                    "tokenAmount": { "amount": amount.to_string(), "decimals": 9 }
                }
            }
        }),
        executable: false,
    }
}

pub(crate) fn mint_account(token_program: Pubkey, decimals: u8) -> AccountInfo {
    AccountInfo {
        lamports: 1_461_600,
        owner: token_program,
        data: json!({
            "program": "spl-token",
            "parsed": { "type": "mint", "info": { "decimals": decimals, "isInitialized": true } }
        }),
        executable: false,
    }
}

#[async_trait::async_trait]
impl SolanaRpc for FakeRpc {
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>> {
        if self.fail_account_lookups {
            return Err(X402Error::rpc(-32005, "Node is behind"));
        }
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        BLOCKHASH.parse()
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signature())
    }

    async fn get_signature_status(&self, _signature: &Signature) -> Result<ConfirmationStatus> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        let index = (*polls as usize - 1).min(self.statuses.len().saturating_sub(1));
        match self.statuses.get(index) {
            Some(Ok(status)) => Ok(*status),
            Some(Err(e)) => Err(X402Error::rpc(-32000, e.to_string())),
            None => Ok(ConfirmationStatus::Unknown),
        }
    }
}
