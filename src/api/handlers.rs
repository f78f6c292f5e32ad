// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::taxonomy::IndexedSign;
use crate::vision::{ModelMode, ModelStatus};

/// Routes advertised by `GET /`
pub const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /classes",
    "POST /recognize",
    "POST /predict",
    "POST /fingerprint",
    "POST /duplicates/check",
    "POST /model/reload",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub model_loaded: bool,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` with a model, `degraded` when serving mocks
    pub status: String,
    pub model_loaded: bool,
    pub model_name: Option<String>,
    pub model_mode: ModelMode,
    pub model_classes: Option<usize>,
    pub last_error: Option<String>,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<IndexedSign>,
    pub count: usize,
}

/// GET /
pub async fn root_handler(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "SignWise Traffic Sign Recognition".to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        status: "running".to_string(),
        model_loaded: state.models.is_loaded(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// GET /health
///
/// Always 200; a missing model is reported as `degraded` since
/// `/recognize` still answers with simulated results.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.models.status();
    Json(HealthResponse {
        status: if status.loaded { "healthy" } else { "degraded" }.to_string(),
        model_loaded: status.loaded,
        model_name: status.model_name,
        model_mode: status.model_mode,
        model_classes: status.model_classes,
        last_error: status.last_error,
        version: crate::version::VERSION_NUMBER.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// GET /classes - The integer-indexed sign table
pub async fn classes_handler(State(state): State<Arc<AppState>>) -> Json<ClassesResponse> {
    let classes = state.recognizer.taxonomy().index_entries();
    Json(ClassesResponse {
        count: classes.len(),
        classes,
    })
}

/// POST /model/reload - Re-read the model from disk
///
/// Disabled unless `ALLOW_MODEL_RELOAD` is set. On failure the previous
/// model keeps serving.
pub async fn reload_model_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelStatus>, ApiError> {
    if !state.config.allow_model_reload {
        return Err(ApiError::Forbidden(
            "Model reload is disabled (set ALLOW_MODEL_RELOAD=true)".to_string(),
        ));
    }

    info!("🔄 Model reload requested");
    let models = state.models.clone();
    let status = tokio::task::spawn_blocking(move || models.reload())
        .await
        .map_err(|e| ApiError::InternalError(format!("Reload task failed: {}", e)))??;

    Ok(Json(status))
}
