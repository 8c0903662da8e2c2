//! Facilitator configuration and response types

use super::payment::{decode_header, encode_header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Facilitator configuration
#[derive(Debug, Clone)]
pub struct FacilitatorConfig {
    /// Base URL of the facilitator service
    pub url: String,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl FacilitatorConfig {
    /// Create a new facilitator config
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Validate the facilitator configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::X402Error::config("Facilitator URL cannot be empty"));
        }

        let parsed = url::Url::parse(&self.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(crate::X402Error::config(
                "Facilitator URL must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self::new(crate::facilitator::DEFAULT_FACILITATOR_URL)
    }
}

/// Payment verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the payment is valid
    pub is_valid: bool,
    /// Reason for invalidity (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// Payer's address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Payment settlement response, also the receipt echoed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    /// Whether the settlement was successful
    pub success: bool,
    /// Error reason if settlement failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// Payer address if applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Settlement transaction signature, empty when nothing was submitted
    #[serde(default)]
    pub transaction: String,
    /// Network where the transaction was executed
    #[serde(default)]
    pub network: String,
}

impl SettleResponse {
    /// The settlement transaction, if one was submitted
    pub fn transaction_id(&self) -> Option<&str> {
        Some(self.transaction.as_str()).filter(|tx| !tx.is_empty())
    }

    /// Encode the settle response to base64
    pub fn to_base64(&self) -> crate::Result<String> {
        encode_header(self)
    }

    /// Decode a base64-encoded settle response
    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        decode_header(encoded)
    }
}

/// Supported payment schemes and networks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedKinds {
    /// List of supported payment schemes and networks
    #[serde(default)]
    pub kinds: Vec<SupportedKind>,
}

impl SupportedKinds {
    /// The kind advertised for a scheme on a network, preferring the newest protocol version
    pub fn find(&self, scheme: &str, network: &str) -> Option<&SupportedKind> {
        self.kinds
            .iter()
            .filter(|kind| kind.scheme == scheme && kind.network == network)
            .max_by_key(|kind| kind.x402_version)
    }
}

/// Individual supported payment scheme and network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedKind {
    /// Protocol version
    pub x402_version: u32,
    /// Payment scheme identifier
    pub scheme: String,
    /// Blockchain network identifier
    pub network: String,
    /// Additional data provided by the facilitator (e.g. `feePayer`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}
