//! Facilitator client for payment verification and settlement
//!
//! A facilitator is the external service that checks a client's payment proof and
//! submits the settlement transaction on chain. The resource server never touches
//! the blockchain itself; it forwards the `PAYMENT-SIGNATURE` payload here.
//!
//! # Architecture
//!
//! - [`FacilitatorClient`] - HTTP client for `/verify`, `/settle` and `/supported`
//! - Tests - mockito-backed facilitator responses
//!
//! # Examples
//!
//! ```no_run
//! use deep_thought_x402::facilitator::FacilitatorClient;
//! use deep_thought_x402::types::FacilitatorConfig;
//!
//! # async fn example() -> deep_thought_x402::Result<()> {
//! let client = FacilitatorClient::new(FacilitatorConfig::default())?;
//!
//! let supported = client.supported().await?;
//! for kind in &supported.kinds {
//!     println!("{} on {}", kind.scheme, kind.network);
//! }
//!
//! # let payment_payload = todo!();
//! # let payment_requirements = todo!();
//! let verify_response = client.verify(&payment_payload, &payment_requirements).await?;
//! if verify_response.is_valid {
//!     let settle_response = client.settle(&payment_payload, &payment_requirements).await?;
//!     println!("Payment settled: {}", settle_response.transaction);
//! }
//! # Ok(())
//! # }
//! ```

use crate::types::{
    FacilitatorConfig, PaymentPayload, PaymentRequirements, SettleResponse, SupportedKinds,
    VerifyResponse, X402_VERSION,
};
use crate::{Result, X402Error};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};


/// Default facilitator URL
pub const DEFAULT_FACILITATOR_URL: &str = "https://facilitator.payai.network";

/// Facilitator client for verifying and settling payments
#[derive(Debug, Clone)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator service
    url: String,
    /// HTTP client
    client: Client,
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| X402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url,
            client,
        })
    }

    fn request_body(
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Value {
        json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payment_payload,
            "paymentRequirements": payment_requirements,
        })
    }

    /// POST `{x402Version, paymentPayload, paymentRequirements}` to `path`
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        failure: &str,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<T> {
        let request_body = Self::request_body(payment_payload, payment_requirements);
        let endpoint = format!("{}/{}", self.url, path);

        tracing::debug!(
            %endpoint,
            body = %serde_json::to_string(&request_body).unwrap_or_default(),
            "Facilitator request"
        );

        let response = self.client.post(&endpoint).json(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(%endpoint, %status, body = %response_body, "Facilitator request failed");
            return Err(X402Error::facilitator_error(format!(
                "{} with status: {}. Response: {}",
                failure, status, response_body
            )));
        }

        Ok(response.json().await?)
    }

    /// Verify a payment without executing the transaction
    pub async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        let verify_response: VerifyResponse = self
            .post("verify", "Verification failed", payment_payload, payment_requirements)
            .await?;
        tracing::debug!(
            is_valid = verify_response.is_valid,
            invalid_reason = ?verify_response.invalid_reason,
            "Facilitator verify response"
        );
        Ok(verify_response)
    }

    /// Settle a verified payment by executing the transaction
    pub async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        let settle_response: SettleResponse = self
            .post("settle", "Settlement failed", payment_payload, payment_requirements)
            .await?;
        tracing::debug!(
            success = settle_response.success,
            transaction = %settle_response.transaction,
            "Facilitator settle response"
        );
        Ok(settle_response)
    }

    /// Get supported payment schemes and networks
    pub async fn supported(&self) -> Result<SupportedKinds> {
        let response = self
            .client
            .get(format!("{}/supported", self.url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(X402Error::facilitator_error(format!(
                "Failed to get supported kinds with status: {}",
                response.status()
            )));
        }

        let supported: SupportedKinds = response.json().await?;
        Ok(supported)
    }

    /// Get the base URL of this facilitator
    pub fn url(&self) -> &str {
        &self.url
    }
}
