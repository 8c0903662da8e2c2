//! Client-side payment schemes

use crate::types::{networks, PaymentPayload, PaymentRequired, PaymentRequirements};
use crate::{Result, X402Error};
use serde_json::Value;
use std::sync::Arc;

/// Produces the scheme-specific `payload` for one accepted requirement
#[async_trait::async_trait]
pub trait SchemeClient: Send + Sync {
    /// Scheme name, e.g. `exact`
    fn scheme(&self) -> &str;

    async fn create_payload(&self, requirements: &PaymentRequirements) -> Result<Value>;
}

struct Registration {
    network: String,
    client: Arc<dyn SchemeClient>,
}

/// Scheme clients keyed by scheme name and network pattern (`solana:*`)
#[derive(Default)]
pub struct SchemeRegistry {
    registrations: Vec<Registration>,
}

impl std::fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.registrations
                    .iter()
                    .map(|r| format!("{}@{}", r.client.scheme(), r.network)),
            )
            .finish()
    }
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for every network matching `network`
    pub fn register(&mut self, network: impl Into<String>, client: Arc<dyn SchemeClient>) -> &mut Self {
        self.registrations.push(Registration {
            network: network.into(),
            client,
        });
        self
    }

    fn client_for(&self, requirements: &PaymentRequirements) -> Option<&Arc<dyn SchemeClient>> {
        self.registrations
            .iter()
            .find(|r| {
                r.client.scheme() == requirements.scheme
                    && networks::matches(&r.network, &requirements.network)
            })
            .map(|r| &r.client)
    }

    /// First offered requirement that a registered client can pay
    pub fn select<'a>(
        &self,
        accepts: &'a [PaymentRequirements],
    ) -> Option<(&'a PaymentRequirements, Arc<dyn SchemeClient>)> {
        accepts
            .iter()
            .find_map(|req| self.client_for(req).map(|client| (req, Arc::clone(client))))
    }

    /// Build the payment for a 402 challenge
    pub async fn create_payment_payload(&self, required: &PaymentRequired) -> Result<PaymentPayload> {
        let (requirements, client) = self
            .select(&required.accepts)
            .ok_or(X402Error::NoMatchingScheme)?;

        tracing::debug!(
            scheme = %requirements.scheme,
            network = %requirements.network,
            amount = %requirements.amount,
            "Creating payment payload"
        );

        let payload = client.create_payload(requirements).await?;
        Ok(PaymentPayload::new(requirements.clone(), payload).with_resource(required.resource.clone()))
    }
}
