// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint handler

use axum::extract::State;
use axum::Json;
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::recognition::PredictionResponse;
use crate::vision::image_utils::is_image_content_type;

/// Multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

/// POST /predict - Strict detection on an uploaded image
///
/// Unlike `/recognize` this never simulates a result.
///
/// # Request
/// Multipart form with an `image` file field (`image/*` content type).
///
/// # Errors
/// - 400 Bad Request: Missing field, non-image content type, unreadable image
/// - 413 Payload Too Large: Upload exceeds the limit
/// - 503 Service Unavailable: Model not loaded
/// - 500 Internal Server Error: Inference failed
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let limit = state.recognizer.settings().max_image_bytes;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if !is_image_content_type(field.content_type()) {
            return Err(ApiError::ValidationError {
                field: IMAGE_FIELD.to_string(),
                message: format!(
                    "File must be an image, got content type {:?}",
                    field.content_type().unwrap_or("none")
                ),
            });
        }

        let bytes = field.bytes().await.map_err(|e| {
            if e.status().as_u16() == 413 {
                ApiError::PayloadTooLarge {
                    size: limit.saturating_add(1),
                    limit,
                }
            } else {
                ApiError::InvalidRequest(format!("Failed to read upload: {}", e))
            }
        })?;
        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::ValidationError {
        field: IMAGE_FIELD.to_string(),
        message: "image file is required".to_string(),
    })?;

    debug!("Predict request: {} bytes", bytes.len());

    let response = state.recognizer.predict(&bytes).await?;
    Ok(Json(response))
}
