//! Payment middleware implementation

use super::config::PaymentMiddlewareConfig;
use crate::scheme::ResourceServer;
use crate::types::{headers, PaymentPayload, PaymentRequired, PaymentRequirements, SettleResponse};
use crate::{Result, X402Error};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Axum middleware for x402 payments
#[derive(Debug, Clone)]
pub struct PaymentMiddleware {
    pub config: Arc<PaymentMiddlewareConfig>,
    pub resource_server: ResourceServer,
    requirements: Arc<Vec<PaymentRequirements>>,
}

/// Payment processing result
#[derive(Debug)]
pub enum PaymentResult {
    /// Payment verified and settled successfully
    Success {
        response: Response,
        settlement: SettleResponse,
    },
    /// Handler failed, so nothing was settled
    HandlerFailed { response: Response },
    /// Payment required (402 response)
    PaymentRequired { response: Response },
    /// Payment verification failed
    VerificationFailed { response: Response },
    /// Payment settlement failed
    SettlementFailed { response: Response },
}

impl PaymentResult {
    pub fn into_response(self) -> Response {
        match self {
            PaymentResult::Success { response, .. }
            | PaymentResult::HandlerFailed { response }
            | PaymentResult::PaymentRequired { response }
            | PaymentResult::VerificationFailed { response }
            | PaymentResult::SettlementFailed { response } => response,
        }
    }
}

impl PaymentMiddleware {
    /// Create a new payment middleware offering the configured requirements as-is
    pub fn new(config: PaymentMiddlewareConfig, resource_server: ResourceServer) -> Self {
        let requirements = vec![config.create_payment_requirements()];
        Self {
            config: Arc::new(config),
            resource_server,
            requirements: Arc::new(requirements),
        }
    }

    /// Create the middleware and complete its requirements from the facilitator's `/supported`
    pub async fn initialize(
        config: PaymentMiddlewareConfig,
        resource_server: ResourceServer,
    ) -> Self {
        let requirements = resource_server
            .sync_requirements(vec![config.create_payment_requirements()])
            .await;
        Self {
            config: Arc::new(config),
            resource_server,
            requirements: Arc::new(requirements),
        }
    }

    /// Get the middleware configuration
    pub fn config(&self) -> &PaymentMiddlewareConfig {
        &self.config
    }

    /// Requirements offered in every challenge
    pub fn requirements(&self) -> &[PaymentRequirements] {
        &self.requirements
    }

    /// The offered requirement a payment claims to satisfy
    fn matching_requirements(&self, payload: &PaymentPayload) -> Option<&PaymentRequirements> {
        self.requirements
            .iter()
            .find(|requirements| requirements.matches(&payload.accepted))
    }

    /// Process payment with unified flow
    pub async fn process_payment(&self, request: Request, next: Next) -> Result<PaymentResult> {
        let uri = request.uri().path().to_string();

        let payment_header = request
            .headers()
            .get(headers::PAYMENT_SIGNATURE)
            .and_then(|v| v.to_str().ok());

        let Some(payment_b64) = payment_header else {
            let response =
                self.create_payment_required_response("PAYMENT-SIGNATURE header is required", &uri)?;
            return Ok(PaymentResult::PaymentRequired { response });
        };

        let payment_payload = match PaymentPayload::from_base64(payment_b64) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Undecodable payment header");
                let response = self
                    .create_payment_required_response(&format!("Invalid payment: {}", e), &uri)?;
                return Ok(PaymentResult::PaymentRequired { response });
            }
        };

        let Some(payment_requirements) = self.matching_requirements(&payment_payload) else {
            let response = self.create_payment_required_response(
                "Payment does not match the accepted requirements",
                &uri,
            )?;
            return Ok(PaymentResult::VerificationFailed { response });
        };

        let verify_response = self
            .resource_server
            .verify(&payment_payload, payment_requirements)
            .await
            .map_err(|e| X402Error::facilitator_error(format!("Payment verification failed: {}", e)))?;

        if !verify_response.is_valid {
            let reason = verify_response
                .invalid_reason
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info!(%reason, payer = ?verify_response.payer, "Payment rejected");
            let response = self.create_payment_required_response(
                &format!("Payment verification failed: {}", reason),
                &uri,
            )?;
            return Ok(PaymentResult::VerificationFailed { response });
        }

        // Execute the handler
        let mut response = next.run(request).await;

        if response.status().as_u16() >= 400 {
            tracing::warn!(status = %response.status(), "Handler failed, payment not settled");
            return Ok(PaymentResult::HandlerFailed { response });
        }

        let settle_response = match self
            .resource_server
            .settle(&payment_payload, payment_requirements)
            .await
        {
            Ok(settle) if settle.success => settle,
            Ok(settle) => {
                let reason = settle.error_reason.unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(%reason, "Settlement rejected");
                let response = self.create_payment_required_response(
                    &format!("Settlement failed: {}", reason),
                    &uri,
                )?;
                return Ok(PaymentResult::SettlementFailed { response });
            }
            Err(e) => {
                tracing::error!(error = %e, "Settlement request failed");
                let response = self
                    .create_payment_required_response(&format!("Settlement failed: {}", e), &uri)?;
                return Ok(PaymentResult::SettlementFailed { response });
            }
        };

        tracing::info!(
            transaction = %settle_response.transaction,
            payer = ?settle_response.payer,
            "Payment settled"
        );

        let settlement_header = settle_response.to_base64()?;
        if let Ok(header_value) = HeaderValue::from_str(&settlement_header) {
            response
                .headers_mut()
                .insert(headers::PAYMENT_RESPONSE, header_value);
        }

        Ok(PaymentResult::Success {
            response,
            settlement: settle_response,
        })
    }

    /// 402 carrying the challenge both in the `payment-required` header and as JSON
    fn create_payment_required_response(&self, error: &str, request_uri: &str) -> Result<Response> {
        let payment_required = PaymentRequired::new(
            error,
            self.config.resource_info(request_uri),
            self.requirements.to_vec(),
        );

        let header = HeaderValue::from_str(&payment_required.to_base64()?).map_err(|e| {
            X402Error::config(format!("Failed to encode payment-required header: {}", e))
        })?;

        let mut response = (StatusCode::PAYMENT_REQUIRED, Json(payment_required)).into_response();
        response
            .headers_mut()
            .insert(headers::PAYMENT_REQUIRED, header);
        Ok(response)
    }
}

/// Axum middleware function for handling x402 payments
pub async fn payment_middleware(
    State(middleware): State<PaymentMiddleware>,
    request: Request,
    next: Next,
) -> Result<Response> {
    Ok(middleware.process_payment(request, next).await?.into_response())
}
