//! Server-side payment schemes and the facilitator-backed resource server

use crate::facilitator::FacilitatorClient;
use crate::types::{
    networks, PaymentPayload, PaymentRequirements, SettleResponse, SupportedKind, VerifyResponse,
};
use crate::Result;
use std::sync::Arc;

/// Completes route requirements with what the facilitator advertises for the scheme
pub trait SchemeServer: Send + Sync {
    /// Scheme name, e.g. `exact`
    fn scheme(&self) -> &str;

    fn enhance_requirements(&self, requirements: &mut PaymentRequirements, kind: &SupportedKind);
}

#[derive(Clone)]
struct Registration {
    network: String,
    scheme: Arc<dyn SchemeServer>,
}

/// Verifies and settles payments through a facilitator for the registered schemes
#[derive(Clone)]
pub struct ResourceServer {
    facilitator: FacilitatorClient,
    registrations: Vec<Registration>,
}

impl std::fmt::Debug for ResourceServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceServer")
            .field("facilitator", &self.facilitator.url())
            .field(
                "schemes",
                &self
                    .registrations
                    .iter()
                    .map(|r| format!("{}@{}", r.scheme.scheme(), r.network))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ResourceServer {
    pub fn new(facilitator: FacilitatorClient) -> Self {
        Self {
            facilitator,
            registrations: Vec::new(),
        }
    }

    /// Register `scheme` for every network matching `network`
    pub fn register(mut self, network: impl Into<String>, scheme: Arc<dyn SchemeServer>) -> Self {
        self.registrations.push(Registration {
            network: network.into(),
            scheme,
        });
        self
    }

    pub fn facilitator(&self) -> &FacilitatorClient {
        &self.facilitator
    }

    fn scheme_for(&self, requirements: &PaymentRequirements) -> Option<&Arc<dyn SchemeServer>> {
        self.registrations
            .iter()
            .find(|r| {
                r.scheme.scheme() == requirements.scheme
                    && networks::matches(&r.network, &requirements.network)
            })
            .map(|r| &r.scheme)
    }

    /// Fill in facilitator-provided fields (such as the SVM fee payer).
    ///
    /// When `/supported` cannot be fetched the requirements are returned unchanged
    /// and a warning is logged.
    pub async fn sync_requirements(
        &self,
        mut requirements: Vec<PaymentRequirements>,
    ) -> Vec<PaymentRequirements> {
        let supported = match self.facilitator.supported().await {
            Ok(supported) => supported,
            Err(e) => {
                tracing::warn!(
                    facilitator = %self.facilitator.url(),
                    error = %e,
                    "Could not fetch supported payment kinds; continuing without them"
                );
                return requirements;
            }
        };

        for requirement in &mut requirements {
            let Some(scheme) = self.scheme_for(requirement) else {
                tracing::warn!(
                    scheme = %requirement.scheme,
                    network = %requirement.network,
                    "No server scheme registered"
                );
                continue;
            };
            match supported.find(&requirement.scheme, &requirement.network) {
                Some(kind) => scheme.enhance_requirements(requirement, kind),
                None => tracing::warn!(
                    scheme = %requirement.scheme,
                    network = %requirement.network,
                    "Facilitator does not support this payment kind"
                ),
            }
        }

        requirements
    }

    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        self.facilitator.verify(payload, requirements).await
    }

    pub async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        self.facilitator.settle(payload, requirements).await
    }
}
