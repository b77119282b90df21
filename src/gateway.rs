#[path = "gateway/error.rs"]
mod error;

#[path = "gateway/config.rs"]
mod config;

#[path = "gateway/cors.rs"]
pub mod cors;

#[path = "gateway/auth.rs"]
pub mod auth;

#[path = "gateway/platform.rs"]
mod platform;

#[path = "gateway/mock.rs"]
mod mock;

#[path = "gateway/state.rs"]
mod state;

#[path = "gateway/router.rs"]
mod router;

#[path = "gateway/handlers/mod.rs"]
mod handlers;

use lambda_http::{run, service_fn, Error, Request};
use tracing_subscriber::EnvFilter;

async fn function_handler(
    event: Request,
    state: &state::AppState,
) -> Result<lambda_http::Response<lambda_http::Body>, Error> {
    router::route_request(event, state).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    // Load configuration once per container
    let config = config::GatewayConfig::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        Error::from(format!("Configuration error: {}", e))
    })?;

    let state = state::AppState::from_config(config)?;

    run(service_fn(|event: Request| function_handler(event, &state))).await
}
