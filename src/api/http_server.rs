// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::fingerprint::{duplicate_check_handler, fingerprint_handler};
use super::handlers::{classes_handler, health_handler, reload_model_handler, root_handler};
use super::predict::predict_handler;
use super::recognize::recognize_handler;
use crate::config::ServiceConfig;
use crate::recognition::SignRecognizer;
use crate::taxonomy::Taxonomy;
use crate::vision::ModelManager;

/// Shared state of the HTTP surface
#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<SignRecognizer>,
    pub models: Arc<ModelManager>,
    pub config: Arc<ServiceConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig, models: Arc<ModelManager>) -> Self {
        let recognizer = SignRecognizer::new(
            models.clone(),
            Taxonomy::new(),
            config.recognizer_settings(),
        );
        Self {
            recognizer: Arc::new(recognizer),
            models,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Default configuration, no model loaded
    pub fn new_for_test() -> Self {
        let config = ServiceConfig::default();
        let models = Arc::new(ModelManager::unloaded(config.model_config()));
        Self::new(config, models)
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o.trim() == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.json_body_limit();

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/classes", get(classes_handler))
        .route("/recognize", post(recognize_handler))
        .route("/predict", post(predict_handler))
        .route("/fingerprint", post(fingerprint_handler))
        .route("/duplicates/check", post(duplicate_check_handler))
        .route("/model/reload", post(reload_model_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.socket_addr();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
