// SPDX-License-Identifier: MIT

//! Pinspire API Server
//!
//! Backend for the Pinspire social-media scheduler: account management,
//! AI caption/image generation, draft posts, and Pinterest publishing.

use pinspire::{
    config::Config,
    db::FirestoreDb,
    middleware::RateLimiter,
    services::{AiService, PinterestService, PostPublisher},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Pinspire API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let pinterest = PinterestService::new(db.clone(), config.clone());
    let ai = AiService::new(&config.openai_api_key);
    let publisher = PostPublisher::new(db.clone(), pinterest.clone());
    let rate_limiter = RateLimiter::default();

    tracing::info!(ai_mock = ai.is_mock(), "Services initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        pinterest,
        ai,
        publisher,
        rate_limiter,
    });

    // Build router
    let app = pinspire::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pinspire=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
