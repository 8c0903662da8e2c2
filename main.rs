//! Deep Thought resource server
//!
//! Serves the answer to life, the universe and everything for 0.0042 WSOL.
//!
//! ## Configuration
//!
//! - `SVM_PAYEE_ADDRESS`: wallet receiving payments (required)
//! - `PORT`: listen port, default 4021
//! - `FACILITATOR_URL`: x402 facilitator, default PayAI
//! - `RUST_LOG`: log filter, default `info`

use deep_thought_x402::{config::ServerConfig, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Set it in .env file or export it directly");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> deep_thought_x402::Result<()> {
    let listener = server::bind(&config).await?;
    let banner = server::banner(&config);
    let app = server::build_app(config).await?;

    println!("{}", banner);
    server::serve(listener, app).await
}
