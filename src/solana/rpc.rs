//! Solana JSON-RPC access
//!
//! The workflow code depends on the [`SolanaRpc`] trait so tests can swap in an
//! in-memory chain. [`RpcClient`] is the HTTP implementation.

use super::pubkey::{Hash, Pubkey, Signature};
use super::transaction::Transaction;
use crate::{Result, X402Error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default public mainnet endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Commitment reached by a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    /// The node has no record of the signature yet
    Unknown,
    Processed,
    Confirmed,
    Finalized,
}

impl ConfirmationStatus {
    /// `confirmed` or `finalized`
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Finalized)
    }
}

/// Account returned by `getAccountInfo` with `jsonParsed` encoding
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Value,
    #[serde(default)]
    pub executable: bool,
}

impl AccountInfo {
    /// Token balance in base units of a parsed token account
    pub fn token_amount(&self) -> Option<u64> {
        self.data
            .pointer("/parsed/info/tokenAmount/amount")?
            .as_str()?
            .parse()
            .ok()
    }

    /// Decimals of a parsed mint account
    pub fn mint_decimals(&self) -> Option<u8> {
        self.data
            .pointer("/parsed/info/decimals")?
            .as_u64()?
            .try_into()
            .ok()
    }
}

/// The chain operations used by the balance gate, funding workflow and exact scheme
#[async_trait::async_trait]
pub trait SolanaRpc: Send + Sync {
    /// `None` when the account does not exist
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>>;

    async fn get_latest_blockhash(&self) -> Result<Hash>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    async fn get_signature_status(&self, signature: &Signature) -> Result<ConfirmationStatus>;
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct LatestBlockhash {
    blockhash: Hash,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<ConfirmationStatus>,
}

/// JSON-RPC over HTTP
#[derive(Debug)]
pub struct RpcClient {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(X402Error::config(format!(
                "RPC URL must start with http:// or https://, got {}",
                url
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| X402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, url = %self.url, "Solana RPC request");

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(X402Error::rpc(i64::from(status.as_u16()), text));
        }

        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(X402Error::rpc(error.code, error.message));
        }
        envelope
            .result
            .ok_or_else(|| X402Error::rpc(-32603, format!("{} returned no result", method)))
    }
}

#[async_trait::async_trait]
impl SolanaRpc for RpcClient {
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>> {
        let response: WithContext<Option<AccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "jsonParsed" }]),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let response: WithContext<LatestBlockhash> =
            self.call("getLatestBlockhash", json!([])).await?;
        Ok(response.value.blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let signature: String = self
            .call(
                "sendTransaction",
                json!([transaction.to_base64(), { "encoding": "base64" }]),
            )
            .await?;
        signature.parse()
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([[signature.to_string()]]))
            .await?;

        Ok(response
            .value
            .into_iter()
            .next()
            .flatten()
            .and_then(|status| status.confirmation_status)
            .unwrap_or(ConfirmationStatus::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solana::instruction::system;
    use crate::solana::keypair::Keypair;
    use crate::solana::transaction::Message;
    use mockito::{Matcher, Server};

    const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        assert!(RpcClient::new("ws://localhost:8900").is_err());
    }

    #[tokio::test]
    async fn test_get_latest_blockhash() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getLatestBlockhash" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "context": { "slot": 2792 },
                        "value": { "blockhash": BLOCKHASH, "lastValidBlockHeight": 3090 }
                    }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let hash = client.get_latest_blockhash().await.unwrap();
        assert_eq!(hash.to_string(), BLOCKHASH);
    }

    #[tokio::test]
    async fn test_get_account_info_missing_account() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "getAccountInfo" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "context": { "slot": 1 }, "value": null }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let info = client.get_account_info(&Pubkey::default()).await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn test_get_account_info_parsed_token_account() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "context": { "slot": 1 },
                        "value": {
                            "lamports": 7_039_280u64,
                            "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                            "executable": false,
                            "rentEpoch": 18446744073709551615u64,
                            "space": 165,
                            "data": {
                                "program": "spl-token",
                                "parsed": {
                                    "type": "account",
                                    "info": {
                                        "isNative": true,
                                        "mint": "So11111111111111111111111111111111111111112",
                                        "tokenAmount": {
                                            "amount": "5000000",
                                            "decimals": 9,
                                            "uiAmountString": "0.005"
                                        }
                                    }
                                },
                                "space": 165
                            }
                        }
                    }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let info = client
            .get_account_info(&Pubkey::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.token_amount(), Some(5_000_000));
        assert_eq!(info.mint_decimals(), None);
    }

    #[tokio::test]
    async fn test_rpc_error_object_is_surfaced() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32002, "message": "Transaction simulation failed" }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let payer = Keypair::from_seed(&[1u8; 32]);
        let ix = system::transfer(&payer.pubkey(), &Pubkey::new_from_array([2u8; 32]), 1);
        let message = Message::compile(&payer.pubkey(), &[ix], BLOCKHASH.parse().unwrap()).unwrap();
        let mut tx = Transaction::new_unsigned(message);
        tx.sign(&[&payer]).unwrap();

        let err = client.send_transaction(&tx).await.unwrap_err();
        assert!(matches!(err, X402Error::Rpc { code: -32002, .. }));
    }

    #[tokio::test]
    async fn test_send_transaction_returns_signature() {
        let payer = Keypair::from_seed(&[1u8; 32]);
        let ix = system::transfer(&payer.pubkey(), &Pubkey::new_from_array([2u8; 32]), 1);
        let message = Message::compile(&payer.pubkey(), &[ix], BLOCKHASH.parse().unwrap()).unwrap();
        let mut tx = Transaction::new_unsigned(message);
        tx.sign(&[&payer]).unwrap();

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "sendTransaction",
                "params": [tx.to_base64(), { "encoding": "base64" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "jsonrpc": "2.0", "id": 1, "result": tx.signature().to_string() })
                    .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let signature = client.send_transaction(&tx).await.unwrap();
        assert_eq!(signature, tx.signature());
    }

    #[tokio::test]
    async fn test_signature_status_mapping() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "context": { "slot": 82 },
                        "value": [{
                            "slot": 72,
                            "confirmations": 10,
                            "err": null,
                            "confirmationStatus": "confirmed"
                        }]
                    }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let status = client
            .get_signature_status(&Signature::default())
            .await
            .unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed);
        assert!(status.is_confirmed());
    }

    #[tokio::test]
    async fn test_unknown_signature_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "context": { "slot": 82 }, "value": [null] }
                })
                .to_string(),
            )
            .create();

        let client = RpcClient::new(server.url()).unwrap();
        let status = client
            .get_signature_status(&Signature::default())
            .await
            .unwrap();
        assert_eq!(status, ConfirmationStatus::Unknown);
        assert!(!ConfirmationStatus::Processed.is_confirmed());
    }
}
