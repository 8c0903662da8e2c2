//! Payment-aware HTTP client
//!
//! [`X402Client`] wraps a [`Transport`] in [`PaymentTransport`], so a `402 Payment
//! Required` answer is paid through the [`SchemeRegistry`] and retried once.
//!
//! # Examples
//!
//! ```no_run
//! use deep_thought_x402::client::{settle_response, X402Client};
//! use deep_thought_x402::scheme::{register_exact_svm, SchemeRegistry};
//! use deep_thought_x402::solana::{Keypair, RpcClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> deep_thought_x402::Result<()> {
//! let signer = Arc::new(Keypair::read_from_file("/home/arthur/.config/solana/id.json")?);
//! let rpc = Arc::new(RpcClient::new("https://api.mainnet-beta.solana.com")?);
//!
//! let mut registry = SchemeRegistry::new();
//! register_exact_svm(&mut registry, signer, rpc);
//!
//! let client = X402Client::new(registry);
//! let response = client.get("http://localhost:4021/meaning-of-life").await?;
//!
//! if let Some(settlement) = settle_response(response.headers()) {
//!     println!("paid in {}", settlement.transaction);
//! }
//! # Ok(())
//! # }
//! ```

pub mod transport;

pub use transport::{HttpTransport, PaymentTransport, Transport};

use crate::scheme::SchemeRegistry;
use crate::types::{headers, SettleResponse};
use crate::{Result, X402Error};
use http::{HeaderMap, Request, Response};
use std::sync::Arc;

/// Settlement receipt from the `payment-response` header.
///
/// Absent or undecodable headers yield `None`.
pub fn settle_response(response_headers: &HeaderMap) -> Option<SettleResponse> {
    let value = response_headers.get(headers::PAYMENT_RESPONSE)?.to_str().ok()?;
    SettleResponse::from_base64(value).ok()
}

/// HTTP client that pays for 402-protected resources
pub struct X402Client<T = HttpTransport> {
    transport: PaymentTransport<T>,
}

impl X402Client<HttpTransport> {
    /// Client over a default reqwest transport
    pub fn new(registry: SchemeRegistry) -> Self {
        Self::with_transport(HttpTransport::default(), Arc::new(registry))
    }
}

impl<T: Transport> X402Client<T> {
    pub fn with_transport(transport: T, registry: Arc<SchemeRegistry>) -> Self {
        Self {
            transport: PaymentTransport::new(transport, registry),
        }
    }

    /// GET `url`, paying if asked to.
    ///
    /// A final status outside 2xx becomes [`X402Error::RequestFailed`].
    pub async fn get(&self, url: &str) -> Result<Response<Vec<u8>>> {
        let request = Request::get(url)
            .body(Vec::new())
            .map_err(|e| X402Error::config(format!("Invalid request URL {}: {}", url, e)))?;

        let response = self.transport.send(request).await?;
        if !response.status().is_success() {
            return Err(X402Error::RequestFailed {
                status: response.status().as_u16(),
                body: String::from_utf8_lossy(response.body()).into_owned(),
            });
        }
        Ok(response)
    }
}
