// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fingerprint and duplicate-check request types

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::fingerprint::Fingerprint;

/// Request to fingerprint an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintRequest {
    #[serde(default, alias = "imageBase64", alias = "image")]
    pub image_base64: Option<String>,
}

impl FingerprintRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.image_base64.as_deref() {
            Some(image) if !image.trim().is_empty() => Ok(()),
            _ => Err(ApiError::ValidationError {
                field: "image_base64".to_string(),
                message: "image_base64 is required".to_string(),
            }),
        }
    }
}

/// Request to check one fingerprint against a caller-supplied corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheckRequest {
    pub fingerprint: String,

    #[serde(default, alias = "existingFingerprints")]
    pub existing_fingerprints: Vec<String>,

    #[serde(default)]
    pub threshold: Option<u32>,
}

impl DuplicateCheckRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.fingerprint.parse::<Fingerprint>().is_err() {
            return Err(ApiError::ValidationError {
                field: "fingerprint".to_string(),
                message: "fingerprint must be 16 hex characters".to_string(),
            });
        }

        if matches!(self.threshold, Some(t) if t > 64) {
            return Err(ApiError::ValidationError {
                field: "threshold".to_string(),
                message: "threshold must be at most 64".to_string(),
            });
        }

        Ok(())
    }
}
