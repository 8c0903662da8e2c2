//! Error types for the x402 payment flow

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, X402Error>;

/// Errors produced by the server, the paid-request client and the Solana workflow
#[derive(Error, Debug)]
pub enum X402Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Network not supported: {network}")]
    NetworkNotSupported { network: String },

    #[error("Invalid payment payload: {message}")]
    InvalidPaymentPayload { message: String },

    #[error("Invalid payment requirements: {message}")]
    InvalidPaymentRequirements { message: String },

    #[error("Payment verification failed: {message}")]
    PaymentVerificationFailed { message: String },

    #[error("Facilitator error: {message}")]
    FacilitatorError { message: String },

    #[error("No registered payment scheme accepts any of the offered requirements")]
    NoMatchingScheme,

    #[error("Invalid key: {message}")]
    InvalidKey { message: String },

    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transaction {signature} not confirmed after {attempts} status checks")]
    ConfirmationTimeout { signature: String, attempts: u32 },

    #[error("Request failed: {status} - {body}")]
    RequestFailed { status: u16, body: String },
}

impl X402Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_payment_payload(message: impl Into<String>) -> Self {
        Self::InvalidPaymentPayload {
            message: message.into(),
        }
    }

    pub fn invalid_payment_requirements(message: impl Into<String>) -> Self {
        Self::InvalidPaymentRequirements {
            message: message.into(),
        }
    }

    pub fn payment_verification_failed(message: impl Into<String>) -> Self {
        Self::PaymentVerificationFailed {
            message: message.into(),
        }
    }

    pub fn facilitator_error(message: impl Into<String>) -> Self {
        Self::FacilitatorError {
            message: message.into(),
        }
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }

    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Whether this error is the confirmation-poll timeout of a submitted transaction
    pub fn is_confirmation_timeout(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for X402Error {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            X402Error::InvalidPaymentPayload { .. }
            | X402Error::PaymentVerificationFailed { .. } => StatusCode::PAYMENT_REQUIRED,
            X402Error::InvalidPaymentRequirements { .. } | X402Error::Base64(_) => {
                StatusCode::BAD_REQUEST
            }
            X402Error::FacilitatorError { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(%status, error = %self, "request failed");

        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
