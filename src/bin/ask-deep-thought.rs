//! Ask Deep Thought
//!
//! Pays 0.0042 WSOL for the meaning of life, wrapping SOL first when the WSOL
//! balance is short.
//!
//! ## Configuration
//!
//! - `SERVER_URL`: resource server, default `http://localhost:4021`
//! - `KEYPAIR_PATH`: Solana CLI keypair, default `~/.config/solana/id.json`
//! - `RPC_URL`: Solana JSON-RPC, default mainnet-beta
//! - `RUST_LOG`: log filter, default `info`

use deep_thought_x402::{
    client::{settle_response, X402Client},
    config::ClientConfig,
    scheme::{register_exact_svm, SchemeRegistry},
    solana::{Keypair, RpcClient},
    types::Network,
    wallet::Wallet,
    Result,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ANSWER_HEADERS: [&str; 4] = ["X-Deep-Thought", "X-Compute-Time", "X-Towel", "X-Vogon-Poetry"];

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(ClientConfig::from_env()).await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Lamports as whole SOL, e.g. `0.0042`
fn sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9).normalize()
}

fn rule() -> String {
    "=".repeat(60)
}

async fn run(config: ClientConfig) -> Result<()> {
    let keypair = Arc::new(Keypair::read_from_file(&config.keypair_path)?);
    let rpc = Arc::new(RpcClient::new(&config.rpc_url)?);
    let wallet = Wallet::new(keypair.clone(), rpc.clone());

    println!("{}", rule());
    println!("x402 CLI Client - The Meaning of Life");
    println!("{}", rule());
    println!("Wallet: {}", wallet.pubkey());

    let balance = wallet.balance().await;
    println!("WSOL Balance: {} SOL", sol(balance));

    if balance < config.required_balance {
        println!(
            "Insufficient WSOL. Need {}, have {}",
            sol(config.required_balance),
            sol(balance)
        );
        println!("\nWrapping {} SOL to WSOL...", sol(config.wrap_amount));
        let signature = wallet.wrap(config.wrap_amount).await?;
        println!("Wrap tx: {}", signature);
        println!("Wrap confirmed!");
    }

    let url = config.meaning_of_life_url();
    println!("\nQuerying Deep Thought at {}...", url);
    println!("(This may take 7.5 million years... or about 4 seconds)\n");

    let mut registry = SchemeRegistry::new();
    register_exact_svm(&mut registry, keypair, rpc);
    let response = X402Client::new(registry).get(&url).await?;

    let answer: serde_json::Value = serde_json::from_slice(response.body())?;
    println!("{}", rule());
    println!("DEEP THOUGHT RESPONSE:");
    println!("{}", rule());
    println!("{}", serde_json::to_string_pretty(&answer)?);
    println!("{}", rule());

    println!("\nResponse Headers:");
    for name in ANSWER_HEADERS {
        let value = response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("null");
        println!("  {}: {}", name, value);
    }

    if let Some(settlement) = settle_response(response.headers()) {
        println!("\nPayment Settlement:");
        println!("  Success: {}", settlement.success);
        if let Some(transaction) = settlement.transaction_id() {
            let network = settlement.network.parse().unwrap_or(Network::Mainnet);
            println!("  Transaction: {}", network.explorer_tx_url(transaction));
        }
    }

    Ok(())
}
