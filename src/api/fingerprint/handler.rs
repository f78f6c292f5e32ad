// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fingerprint and duplicate-check handlers

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::{debug, warn};

use super::request::{DuplicateCheckRequest, FingerprintRequest};
use super::response::{DuplicateCheckResponse, FingerprintResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::fingerprint::{check_duplicate, PerceptualHasher};
use crate::vision::image_utils::{strip_data_url, ImageError};

/// POST /fingerprint - Perceptual hash of an image
///
/// Missing input or bad base64 is a 400 and oversize input a 413. Bytes
/// that do not decode as an image are reported as `fingerprint: null`.
pub async fn fingerprint_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FingerprintRequest>,
) -> Result<Json<FingerprintResponse>, ApiError> {
    request.validate()?;

    let encoded = request.image_base64.unwrap_or_default();
    let bytes = STANDARD
        .decode(strip_data_url(&encoded))
        .map_err(ImageError::from)?;

    let limit = state.recognizer.settings().max_image_bytes;
    if bytes.len() > limit {
        return Err(ImageError::TooLarge(bytes.len(), limit).into());
    }

    let size = bytes.len();
    let fingerprint =
        tokio::task::spawn_blocking(move || PerceptualHasher::new().fingerprint_bytes(&bytes))
            .await
            .map_err(|e| ApiError::InternalError(format!("Fingerprint task failed: {}", e)))?;

    let fingerprint = match fingerprint {
        Ok(fp) => Some(fp.to_hex()),
        Err(e) => {
            warn!("Failed to compute pHash: {}", e);
            None
        }
    };

    debug!("Fingerprinted {} byte upload: {:?}", size, fingerprint);

    Ok(Json(FingerprintResponse { fingerprint }))
}

/// POST /duplicates/check - Compare a fingerprint with known fingerprints
///
/// Scans in the given order; the first entry within the threshold wins.
pub async fn duplicate_check_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DuplicateCheckRequest>,
) -> Result<Json<DuplicateCheckResponse>, ApiError> {
    request.validate()?;

    let threshold = request
        .threshold
        .unwrap_or(state.recognizer.settings().duplicate_threshold);

    Ok(Json(check_duplicate(
        &request.fingerprint,
        &request.existing_fingerprints,
        threshold,
    )))
}
