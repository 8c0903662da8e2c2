//! Axum middleware that puts a route behind an x402 payment
//!
//! # Architecture
//!
//! - [`config`] - Route price, asset, payee and resource description
//! - [`payment`] - Verification, settlement and the middleware function
//!
//! # Examples
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use deep_thought_x402::facilitator::FacilitatorClient;
//! use deep_thought_x402::middleware::{payment_middleware, PaymentMiddleware, PaymentMiddlewareConfig};
//! use deep_thought_x402::scheme::{register_exact_svm_server, ResourceServer};
//! use deep_thought_x402::types::FacilitatorConfig;
//!
//! # async fn example() -> deep_thought_x402::Result<()> {
//! let facilitator = FacilitatorClient::new(FacilitatorConfig::default())?;
//! let resource_server = register_exact_svm_server(ResourceServer::new(facilitator));
//!
//! let config = PaymentMiddlewareConfig::new(4_200_000, "GsbwXfJraMomNxBcjYLcG3mxkBUiyWXAB32fGbSMQRdW")
//!     .with_description("The answer")
//!     .with_mime_type("application/json");
//! let middleware = PaymentMiddleware::initialize(config, resource_server).await;
//!
//! let app: Router = Router::new()
//!     .route("/answer", get(|| async { "42" }))
//!     .route_layer(axum::middleware::from_fn_with_state(middleware, payment_middleware));
//! # Ok(())
//! # }
//! ```
//!
//! # Payment Flow
//!
//! 1. Request arrives without PAYMENT-SIGNATURE header → 402 with PAYMENT-REQUIRED
//! 2. Request arrives with PAYMENT-SIGNATURE header → match against the offered requirements
//! 3. Facilitator verifies the payment → 402 if invalid
//! 4. Handler runs; an error status is returned as-is without settlement
//! 5. Facilitator settles → 402 on failure, otherwise PAYMENT-RESPONSE is attached

pub mod config;
pub mod payment;


// Re-export commonly used types
pub use config::PaymentMiddlewareConfig;
pub use payment::{payment_middleware, PaymentMiddleware, PaymentResult};
