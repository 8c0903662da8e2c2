//! Payment-related types (x402 version 2)

use base64::{engine::general_purpose, Engine as _};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// x402 protocol version
pub const X402_VERSION: u32 = 2;

/// Encode a value as base64 JSON for an HTTP header
pub(crate) fn encode_header<T: Serialize>(value: &T) -> crate::Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(general_purpose::STANDARD.encode(json))
}

/// Decode a base64 JSON HTTP header value
pub(crate) fn decode_header<T: DeserializeOwned>(encoded: &str) -> crate::Result<T> {
    let decoded = general_purpose::STANDARD.decode(encoded.trim())?;
    Ok(serde_json::from_slice(&decoded)?)
}

/// One acceptable way to pay for a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Payment scheme identifier (e.g., "exact")
    pub scheme: String,
    /// CAIP-2 network identifier
    pub network: String,
    /// Required payment amount in atomic token units
    pub amount: String,
    /// Token mint address
    pub asset: String,
    /// Recipient wallet address for the payment
    pub pay_to: String,
    /// Maximum time allowed for payment completion in seconds
    pub max_timeout_seconds: u32,
    /// Scheme-specific additional information (the SVM fee payer lives here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl PaymentRequirements {
    /// Create a new payment requirements instance
    pub fn new(
        scheme: impl Into<String>,
        network: impl Into<String>,
        amount: impl Into<String>,
        asset: impl Into<String>,
        pay_to: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            network: network.into(),
            amount: amount.into(),
            asset: asset.into(),
            pay_to: pay_to.into(),
            max_timeout_seconds: 60,
            extra: None,
        }
    }

    /// Get the amount in atomic units
    pub fn amount_as_u64(&self) -> crate::Result<u64> {
        self.amount
            .parse()
            .map_err(|_| crate::X402Error::invalid_payment_requirements("Invalid amount format"))
    }

    /// Get the amount in decimal units (e.g., 0.0042 for 4200000 lamports)
    pub fn amount_in_decimal_units(&self, decimals: u32) -> crate::Result<Decimal> {
        let amount = self.amount_as_u64()?;
        Ok(Decimal::from_i128_with_scale(i128::from(amount), decimals).normalize())
    }

    /// Facilitator account that pays the transaction fee, from `extra.feePayer`
    pub fn fee_payer(&self) -> Option<&str> {
        self.extra.as_ref()?.get("feePayer")?.as_str()
    }

    /// Set `extra.feePayer`, keeping any other extra fields
    pub fn set_fee_payer(&mut self, fee_payer: impl Into<String>) {
        let mut extra = match self.extra.take() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        extra.insert("feePayer".to_string(), Value::String(fee_payer.into()));
        self.extra = Some(Value::Object(extra));
    }

    /// Whether an accepted requirement pays the same scheme, network, amount, asset and recipient
    pub fn matches(&self, other: &PaymentRequirements) -> bool {
        self.scheme == other.scheme
            && self.network == other.network
            && self.amount == other.amount
            && self.asset == other.asset
            && self.pay_to == other.pay_to
    }
}

/// Description of the protected resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// URL of the protected resource
    pub url: String,
    /// Human-readable description of the resource
    #[serde(default)]
    pub description: String,
    /// MIME type of the expected response
    #[serde(default)]
    pub mime_type: String,
}

impl ResourceInfo {
    pub fn new(
        url: impl Into<String>,
        description: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Payment challenge carried by a 402 response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version
    pub x402_version: u32,
    /// Human-readable error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The resource being paid for
    pub resource: ResourceInfo,
    /// Array of acceptable payment methods
    pub accepts: Vec<PaymentRequirements>,
}

impl PaymentRequired {
    /// Create a new payment challenge
    pub fn new(
        error: impl Into<String>,
        resource: ResourceInfo,
        accepts: Vec<PaymentRequirements>,
    ) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: Some(error.into()),
            resource,
            accepts,
        }
    }

    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        decode_header(encoded)
    }

    pub fn to_base64(&self) -> crate::Result<String> {
        encode_header(self)
    }
}

/// Proof of payment attached to the retried request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Protocol version identifier
    pub x402_version: u32,
    /// Resource the payment is for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceInfo>,
    /// The requirement this payment satisfies
    pub accepted: PaymentRequirements,
    /// Scheme-specific payment data
    pub payload: Value,
}

impl PaymentPayload {
    /// Create a new payment payload
    pub fn new(accepted: PaymentRequirements, payload: Value) -> Self {
        Self {
            x402_version: X402_VERSION,
            resource: None,
            accepted,
            payload,
        }
    }

    pub fn with_resource(mut self, resource: ResourceInfo) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Decode a base64-encoded payment payload
    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        decode_header(encoded)
    }

    /// Encode the payment payload to base64
    pub fn to_base64(&self) -> crate::Result<String> {
        encode_header(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants::{assets, networks, schemes};
    use serde_json::json;
    use std::str::FromStr;

    fn requirements() -> PaymentRequirements {
        PaymentRequirements::new(
            schemes::EXACT,
            networks::SOLANA_MAINNET,
            "4200000",
            assets::WSOL_MINT,
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
        )
    }

    #[test]
    fn test_requirements_wire_names() {
        let mut req = requirements();
        req.set_fee_payer("2wKupLR9q6wXYppw8Gr2NvWxKBUqm4PPJKkQfoxHDBg4");

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["payTo"], "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(value["maxTimeoutSeconds"], 60);
        assert_eq!(value["amount"], "4200000");
        assert_eq!(
            value["extra"]["feePayer"],
            "2wKupLR9q6wXYppw8Gr2NvWxKBUqm4PPJKkQfoxHDBg4"
        );
    }

    #[test]
    fn test_amount_in_decimal_units() {
        let req = requirements();
        assert_eq!(req.amount_as_u64().unwrap(), 4_200_000);
        assert_eq!(
            req.amount_in_decimal_units(assets::WSOL_DECIMALS).unwrap(),
            Decimal::from_str("0.0042").unwrap()
        );
    }

    #[test]
    fn test_set_fee_payer_keeps_other_extra_fields() {
        let mut req = requirements();
        req.extra = Some(json!({ "memo": "towel" }));
        req.set_fee_payer("payer");
        assert_eq!(req.fee_payer(), Some("payer"));
        assert_eq!(req.extra.as_ref().unwrap()["memo"], "towel");
    }

    #[test]
    fn test_matches_ignores_extra_and_timeout() {
        let offered = requirements();
        let mut accepted = offered.clone();
        accepted.set_fee_payer("payer");
        accepted.max_timeout_seconds = 300;
        assert!(offered.matches(&accepted));

        accepted.amount = "4199999".to_string();
        assert!(!offered.matches(&accepted));
    }

    #[test]
    fn test_payment_required_header_decodes() {
        let challenge = PaymentRequired::new(
            "Payment required",
            ResourceInfo::new("http://localhost:4021/meaning-of-life", "Deep Thought", "application/json"),
            vec![requirements()],
        );
        let encoded = challenge.to_base64().unwrap();
        let decoded = PaymentRequired::from_base64(&encoded).unwrap();

        assert_eq!(decoded.x402_version, 2);
        assert_eq!(decoded.accepts, vec![requirements()]);
        assert_eq!(decoded.resource.mime_type, "application/json");
    }

    #[test]
    fn test_payment_payload_rejects_garbage() {
        assert!(PaymentPayload::from_base64("not base64 at all!").is_err());
        let not_json = general_purpose::STANDARD.encode("{ nope");
        assert!(PaymentPayload::from_base64(&not_json).is_err());
    }
}
