//! Common constants for networks, schemes, assets and protocol headers

/// CAIP-2 Solana network identifiers
pub mod networks {
    /// Solana mainnet-beta
    pub const SOLANA_MAINNET: &str = "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";
    /// Solana devnet
    pub const SOLANA_DEVNET: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";
    /// Solana testnet
    pub const SOLANA_TESTNET: &str = "solana:4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z";
    /// Pattern matching every Solana network
    pub const SOLANA_ANY: &str = "solana:*";

    /// Check if a network is supported
    pub fn is_supported(network: &str) -> bool {
        matches!(network, SOLANA_MAINNET | SOLANA_DEVNET | SOLANA_TESTNET)
    }

    /// Get all supported networks
    pub fn all_supported() -> Vec<&'static str> {
        vec![SOLANA_MAINNET, SOLANA_DEVNET, SOLANA_TESTNET]
    }

    /// Match a network against an exact identifier or a `namespace:*` pattern
    pub fn matches(pattern: &str, network: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => network.starts_with(prefix),
            None => pattern == network,
        }
    }
}

/// Common payment schemes
pub mod schemes {
    /// Exact payment scheme: the transferred amount equals the price
    pub const EXACT: &str = "exact";
}

/// Payment assets
pub mod assets {
    /// Wrapped SOL mint
    pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";
    /// Wrapped SOL decimals
    pub const WSOL_DECIMALS: u32 = 9;
    /// Display symbol for wrapped SOL
    pub const WSOL_SYMBOL: &str = "WSOL";
}

/// x402 version 2 HTTP header names (lowercase, as HTTP/2 requires)
pub mod headers {
    /// Base64 `PaymentRequired` sent with a 402 response
    pub const PAYMENT_REQUIRED: &str = "payment-required";
    /// Base64 `PaymentPayload` sent by the client on the paid retry
    pub const PAYMENT_SIGNATURE: &str = "payment-signature";
    /// Base64 `SettleResponse` echoed on a paid response
    pub const PAYMENT_RESPONSE: &str = "payment-response";
}
