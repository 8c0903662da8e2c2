//! Request transports and the 402-paying decorator

use crate::scheme::SchemeRegistry;
use crate::types::{headers, PaymentRequired};
use crate::{Result, X402Error};
use http::{HeaderValue, Request, Response, StatusCode};
use reqwest::Client;
use std::sync::Arc;

/// Sends one HTTP request and returns the response
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

/// Plain reqwest transport
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, body) = request.into_parts();

        let response = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;

        let mut builder = Response::builder().status(response.status());
        if let Some(headers) = builder.headers_mut() {
            *headers = response.headers().clone();
        }
        let body = response.bytes().await?.to_vec();

        builder
            .body(body)
            .map_err(|e| X402Error::config(format!("Failed to build response: {}", e)))
    }
}

/// Answers a 402 challenge with a payment and retries the request once
pub struct PaymentTransport<T> {
    inner: T,
    registry: Arc<SchemeRegistry>,
}

impl<T: Transport> PaymentTransport<T> {
    pub fn new(inner: T, registry: Arc<SchemeRegistry>) -> Self {
        Self { inner, registry }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

fn clone_request(request: &Request<Vec<u8>>) -> Request<Vec<u8>> {
    let mut copy = Request::new(request.body().clone());
    *copy.method_mut() = request.method().clone();
    *copy.uri_mut() = request.uri().clone();
    *copy.version_mut() = request.version();
    *copy.headers_mut() = request.headers().clone();
    copy
}

/// Challenge from the `payment-required` header, or the JSON body when the header is absent
fn payment_required(response: &Response<Vec<u8>>) -> Result<PaymentRequired> {
    if let Some(value) = response.headers().get(headers::PAYMENT_REQUIRED) {
        let encoded = value.to_str().map_err(|e| {
            X402Error::invalid_payment_requirements(format!("Invalid payment-required header: {}", e))
        })?;
        return PaymentRequired::from_base64(encoded);
    }

    serde_json::from_slice(response.body()).map_err(|e| {
        X402Error::invalid_payment_requirements(format!(
            "402 response carried no payment requirements: {}",
            e
        ))
    })
}

#[async_trait::async_trait]
impl<T: Transport> Transport for PaymentTransport<T> {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let mut retry = clone_request(&request);

        let response = self.inner.send(request).await?;
        if response.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(response);
        }

        tracing::info!(uri = %retry.uri(), "Received 402 Payment Required");
        let required = payment_required(&response)?;
        let payload = self.registry.create_payment_payload(&required).await?;

        tracing::info!(
            amount = %payload.accepted.amount,
            asset = %payload.accepted.asset,
            pay_to = %payload.accepted.pay_to,
            "Signed payment, retrying request"
        );

        let header = HeaderValue::from_str(&payload.to_base64()?).map_err(|e| {
            X402Error::invalid_payment_payload(format!("Payment header is not valid ASCII: {}", e))
        })?;
        retry.headers_mut().insert(headers::PAYMENT_SIGNATURE, header);

        let paid = self.inner.send(retry).await?;
        tracing::info!(status = %paid.status(), "Paid request completed");
        Ok(paid)
    }
}
