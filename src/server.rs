//! The Deep Thought resource server
//!
//! `GET /meaning-of-life` sits behind the x402 payment middleware, `GET /health`
//! is free. [`build_app`] wires both together from a [`ServerConfig`].

use crate::config::ServerConfig;
use crate::facilitator::FacilitatorClient;
use crate::middleware::{payment_middleware, PaymentMiddleware, PaymentMiddlewareConfig};
use crate::scheme::{register_exact_svm_server, ResourceServer};
use crate::types::{assets, headers, FacilitatorConfig};
use crate::{Result, X402Error};
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const MEANING_OF_LIFE_PATH: &str = "/meaning-of-life";
pub const HEALTH_PATH: &str = "/health";

pub const ROUTE_DESCRIPTION: &str =
    "Deep Thought computed for 7.5 million years. You can skip the wait for a small fee. Don't Panic.";

/// Informational headers set on every answer
pub const ANSWER_HEADERS: [(&str, &str); 4] = [
    ("x-deep-thought", "Computation complete"),
    ("x-compute-time", "7500000 years (discounted for payment)"),
    ("x-towel", "Don't panic"),
    ("x-vogon-poetry", "Spared"),
];

/// Body of a paid `/meaning-of-life` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeaningOfLife {
    pub answer: u32,
    pub question: String,
    pub compute_time: String,
    pub note: String,
    pub disclaimer: String,
}

impl MeaningOfLife {
    pub fn computed() -> Self {
        Self {
            answer: 42,
            question: "Unknown".to_string(),
            compute_time: "7.5 million years".to_string(),
            note: "The supercomputer Deep Thought originally took 7.5 million years to compute this. Your payment expedited the process significantly.".to_string(),
            disclaimer: "Unfortunately, no one actually knew what the Question was. Perhaps you need an even bigger computer for that.".to_string(),
        }
    }
}

/// Shared, read-only handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Payment terms of the metered route
pub fn payment_config(config: &ServerConfig) -> PaymentMiddlewareConfig {
    PaymentMiddlewareConfig::new(config.amount, config.payee.to_string())
        .with_network(config.network)
        .with_description(ROUTE_DESCRIPTION)
        .with_mime_type("application/json")
        .with_resource_root_url(format!("http://localhost:{}", config.port))
}

/// Facilitator-backed resource server with the exact SVM scheme registered
pub fn resource_server(config: &ServerConfig) -> Result<ResourceServer> {
    let facilitator = FacilitatorClient::new(FacilitatorConfig::new(&config.facilitator_url))?;
    Ok(register_exact_svm_server(ResourceServer::new(facilitator)))
}

/// Price label, e.g. `0.0042 WSOL`
pub fn price_label(config: &ServerConfig) -> Result<String> {
    Ok(format!("{} {}", payment_config(config).price()?, assets::WSOL_SYMBOL))
}

/// Build the router with the payment middleware already initialised
pub async fn build_app(config: ServerConfig) -> Result<Router> {
    let middleware =
        PaymentMiddleware::initialize(payment_config(&config), resource_server(&config)?).await;
    Ok(create_app(AppState::new(config), middleware))
}

/// Assemble routes, payment gate, CORS and request tracing
pub fn create_app(state: AppState, middleware: PaymentMiddleware) -> Router {
    Router::new()
        .route(MEANING_OF_LIFE_PATH, get(meaning_of_life))
        .route_layer(axum::middleware::from_fn_with_state(
            middleware,
            payment_middleware,
        ))
        .route(HEALTH_PATH, get(health))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let exposed = [
        headers::PAYMENT_REQUIRED,
        headers::PAYMENT_RESPONSE,
        ANSWER_HEADERS[0].0,
        ANSWER_HEADERS[1].0,
        ANSWER_HEADERS[2].0,
        ANSWER_HEADERS[3].0,
    ]
    .map(HeaderName::from_static);

    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers(exposed)
}

async fn meaning_of_life(State(state): State<AppState>) -> impl IntoResponse {
    // 7.5 million years, compressed
    tokio::time::sleep(state.config.compute_delay).await;

    let mut response = Json(MeaningOfLife::computed()).into_response();
    for (name, value) in ANSWER_HEADERS {
        response
            .headers_mut()
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let config = &state.config;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "network": config.network.as_str(),
        "payee": config.payee.to_string(),
        "price": price_label(config)?,
    })))
}

/// Startup banner
pub fn banner(config: &ServerConfig) -> String {
    let price = price_label(config).unwrap_or_else(|_| config.amount.to_string());
    let rule = "═".repeat(59);
    let row = |label: &str, value: &str| format!("║  {:<13}{:<44}║", label, value);

    [
        format!("╔{}╗", rule),
        format!("║{:^59}║", "x402 \"Meaning of Life\" Server"),
        format!("╠{}╣", rule),
        row("Server:", &format!("http://localhost:{}", config.port)),
        row("Network:", config.network.display_name()),
        row("Facilitator:", &config.facilitator_url),
        row("Price:", &format!("{} (42, obviously)", price)),
        row("Payee:", &config.payee_abbreviated()),
        format!("╠{}╣", rule),
        format!("║  {:<57}║", "Endpoints:"),
        format!("║  • GET {:<17}{:<34}║", MEANING_OF_LIFE_PATH, format!("({})", price)),
        format!("║  • GET {:<17}{:<34}║", HEALTH_PATH, "(free)"),
        format!("╚{}╝", rule),
    ]
    .join("\n")
}

/// Bind `0.0.0.0:{port}`
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let bind_addr = format!("0.0.0.0:{}", config.port);
    TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| X402Error::config(format!("Failed to bind to {}: {}", bind_addr, e)))
}

/// Serve `router` until the listener fails
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Deep Thought listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .await
        .map_err(|e| X402Error::config(format!("Server error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{networks, PaymentPayload, PaymentRequired, SettleResponse};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use mockito::Server;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    const PAYEE: &str = "GsbwXfJraMomNxBcjYLcG3mxkBUiyWXAB32fGbSMQRdW";
    const SETTLE_TX: &str =
        "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

    fn test_config(facilitator_url: &str) -> ServerConfig {
        ServerConfig::from_lookup(|key| match key {
            "SVM_PAYEE_ADDRESS" => Some(PAYEE.to_string()),
            _ => None,
        })
        .unwrap()
        .with_facilitator_url(facilitator_url)
        .with_compute_delay(Duration::ZERO)
    }

    fn offline_app(config: ServerConfig) -> Router {
        let middleware =
            PaymentMiddleware::new(payment_config(&config), resource_server(&config).unwrap());
        create_app(AppState::new(config), middleware)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_price_label() {
        let config = test_config("http://127.0.0.1:1");
        assert_eq!(price_label(&config).unwrap(), "0.0042 WSOL");
    }

    #[test]
    fn test_banner_contents() {
        let banner = banner(&test_config("https://facilitator.payai.network"));
        assert!(banner.contains("http://localhost:4021"));
        assert!(banner.contains("Solana Mainnet"));
        assert!(banner.contains("0.0042 WSOL (42, obviously)"));
        assert!(banner.contains("GsbwXfJr...SMQRdW"));
        assert!(banner.contains("GET /health"));
        assert!(banner.contains("(free)"));
    }

    #[test]
    fn test_banner_rows_are_aligned() {
        let banner = banner(&test_config("https://facilitator.payai.network"));
        let widths: Vec<usize> = banner.lines().map(|line| line.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}", widths);
    }

    #[test]
    fn test_payment_config_for_route() {
        let config = test_config("http://127.0.0.1:1");
        let requirements = payment_config(&config).create_payment_requirements();
        assert_eq!(requirements.amount, "4200000");
        assert_eq!(requirements.network, networks::SOLANA_MAINNET);
        assert_eq!(requirements.pay_to, PAYEE);
        assert_eq!(
            payment_config(&config).resource_info(MEANING_OF_LIFE_PATH).url,
            "http://localhost:4021/meaning-of-life"
        );
    }

    #[tokio::test]
    async fn test_health_is_free() {
        let app = offline_app(test_config("http://127.0.0.1:1"));

        let response = app
            .oneshot(Request::get(HEALTH_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["network"], networks::SOLANA_MAINNET);
        assert_eq!(body["payee"], PAYEE);
        assert_eq!(body["price"], "0.0042 WSOL");
    }

    #[tokio::test]
    async fn test_meaning_of_life_requires_payment() {
        let app = offline_app(test_config("http://127.0.0.1:1"));

        let response = app
            .oneshot(
                Request::get(MEANING_OF_LIFE_PATH)
                    .header(header::ORIGIN, "https://towel.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://towel.example"
        );
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_lowercase();
        assert!(exposed.contains("payment-required"));
        assert!(exposed.contains("x-vogon-poetry"));

        let encoded = response.headers()[headers::PAYMENT_REQUIRED].to_str().unwrap();
        let challenge = PaymentRequired::from_base64(encoded).unwrap();
        assert_eq!(challenge.resource.description, ROUTE_DESCRIPTION);
        assert_eq!(challenge.accepts[0].amount, "4200000");
    }

    #[tokio::test]
    async fn test_paid_request_gets_the_answer() {
        let mut server = Server::new_async().await;
        let _verify = server
            .mock("POST", "/verify")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "isValid": true }).to_string())
            .create_async()
            .await;
        let _settle = server
            .mock("POST", "/settle")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "transaction": SETTLE_TX,
                    "network": networks::SOLANA_MAINNET
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = test_config(&server.url());
        let accepted = payment_config(&config).create_payment_requirements();
        let payload = PaymentPayload::new(accepted, json!({ "transaction": "c2lnbmVk" }));

        let response = offline_app(config)
            .oneshot(
                Request::get(MEANING_OF_LIFE_PATH)
                    .header(headers::PAYMENT_SIGNATURE, payload.to_base64().unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-deep-thought"], "Computation complete");
        assert_eq!(response.headers()["x-towel"], "Don't panic");
        let receipt = response.headers()[headers::PAYMENT_RESPONSE].to_str().unwrap();
        assert_eq!(
            SettleResponse::from_base64(receipt).unwrap().transaction,
            SETTLE_TX
        );

        let body: MeaningOfLife = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(body, MeaningOfLife::computed());
        assert_eq!(body.answer, 42);
    }

    #[tokio::test]
    async fn test_build_app_survives_facilitator_outage() {
        let app = build_app(test_config("http://127.0.0.1:1")).await.unwrap();

        let response = app
            .oneshot(Request::get(HEALTH_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
