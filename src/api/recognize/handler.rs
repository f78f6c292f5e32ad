// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognize endpoint handler

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::debug;

use super::request::RecognizeRequest;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::recognition::RecognitionResponse;
use crate::vision::image_utils::strip_data_url;
use crate::vision::ImageError;

/// POST /recognize - Identify the traffic sign in an image
///
/// Always answers 200 with a [`RecognitionResponse`] once the image decodes.
/// When the model is missing, finds nothing, or fails, the response carries
/// a simulated sign with `is_mock = true`.
///
/// # Request
/// - `image_base64`: Base64 image, data-URL prefix allowed (required)
/// - `existing_fingerprints`: Fingerprints to check for duplicates (optional)
/// - `duplicate_threshold`: Max Hamming distance for a match (optional)
///
/// # Errors
/// - 400 Bad Request: Missing image, bad base64 or unreadable image
/// - 413 Payload Too Large: Decoded image exceeds the upload limit
pub async fn recognize_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<RecognitionResponse>, ApiError> {
    request.validate()?;

    let encoded = request.image_base64.as_deref().unwrap_or_default();
    let bytes = STANDARD
        .decode(strip_data_url(encoded))
        .map_err(ImageError::from)?;

    debug!(
        "Recognize request: {} bytes, {} known fingerprints",
        bytes.len(),
        request.existing_fingerprints.len()
    );

    let response = state
        .recognizer
        .recognize_against(
            &bytes,
            &request.existing_fingerprints,
            request.duplicate_threshold,
        )
        .await?;

    Ok(Json(response))
}
