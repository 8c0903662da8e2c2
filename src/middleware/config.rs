//! Middleware configuration

use crate::types::{assets, schemes, Network, PaymentRequirements, ResourceInfo};
use crate::Result;
use rust_decimal::Decimal;

/// Configuration for payment middleware
#[derive(Debug, Clone)]
pub struct PaymentMiddlewareConfig {
    /// Payment scheme
    pub scheme: String,
    /// Network payments settle on
    pub network: Network,
    /// Price in atomic token units
    pub amount: u64,
    /// Token mint address
    pub asset: String,
    /// Decimals of the asset, for display
    pub asset_decimals: u32,
    /// Recipient wallet address
    pub pay_to: String,
    /// Payment description
    pub description: Option<String>,
    /// MIME type of the expected response
    pub mime_type: Option<String>,
    /// Maximum timeout in seconds
    pub max_timeout_seconds: u32,
    /// Resource URL (if different from request URL)
    pub resource: Option<String>,
    /// Resource root URL for constructing full resource URLs
    pub resource_root_url: Option<String>,
}

impl PaymentMiddlewareConfig {
    /// Exact WSOL payment of `amount` base units on mainnet
    pub fn new(amount: u64, pay_to: impl Into<String>) -> Self {
        Self {
            scheme: schemes::EXACT.to_string(),
            network: Network::Mainnet,
            amount,
            asset: assets::WSOL_MINT.to_string(),
            asset_decimals: assets::WSOL_DECIMALS,
            pay_to: pay_to.into(),
            description: None,
            mime_type: None,
            max_timeout_seconds: 60,
            resource: None,
            resource_root_url: None,
        }
    }

    /// Set the payment description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        self.max_timeout_seconds = max_timeout_seconds;
        self
    }

    /// Set the network
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the asset mint and its decimals
    pub fn with_asset(mut self, asset: impl Into<String>, decimals: u32) -> Self {
        self.asset = asset.into();
        self.asset_decimals = decimals;
        self
    }

    /// Set the resource URL
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the resource root URL
    pub fn with_resource_root_url(mut self, url: impl Into<String>) -> Self {
        self.resource_root_url = Some(url.into());
        self
    }

    /// Payment requirements offered for the route, before facilitator enrichment
    pub fn create_payment_requirements(&self) -> PaymentRequirements {
        let mut requirements = PaymentRequirements::new(
            &self.scheme,
            self.network.as_str(),
            self.amount.to_string(),
            &self.asset,
            &self.pay_to,
        );
        requirements.max_timeout_seconds = self.max_timeout_seconds;
        requirements
    }

    /// Description of the resource behind `request_uri`
    pub fn resource_info(&self, request_uri: &str) -> ResourceInfo {
        let url = if let Some(ref resource_url) = self.resource {
            resource_url.clone()
        } else if let Some(ref root_url) = self.resource_root_url {
            format!("{}{}", root_url.trim_end_matches('/'), request_uri)
        } else {
            request_uri.to_string()
        };

        ResourceInfo::new(
            url,
            self.description.as_deref().unwrap_or("Payment required"),
            self.mime_type.as_deref().unwrap_or("application/json"),
        )
    }

    /// Price in whole asset units, e.g. `0.0042`
    pub fn price(&self) -> Result<Decimal> {
        self.create_payment_requirements()
            .amount_in_decimal_units(self.asset_decimals)
    }
}
