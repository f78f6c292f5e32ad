// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognize request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Request for sign recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeRequest {
    /// Base64-encoded image, optionally with a `data:image/...;base64,` prefix
    #[serde(default, alias = "imageBase64", alias = "image")]
    pub image_base64: Option<String>,

    /// Known fingerprints to check the image against
    #[serde(default, alias = "existingFingerprints")]
    pub existing_fingerprints: Vec<String>,

    /// Overrides the service's duplicate threshold for this request
    #[serde(default, alias = "duplicateThreshold")]
    pub duplicate_threshold: Option<u32>,
}

impl RecognizeRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self
            .image_base64
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
        {
            return Err(ApiError::ValidationError {
                field: "image_base64".to_string(),
                message: "image_base64 is required".to_string(),
            });
        }

        if let Some(threshold) = self.duplicate_threshold {
            if threshold > 64 {
                return Err(ApiError::ValidationError {
                    field: "duplicate_threshold".to_string(),
                    message: format!("duplicate_threshold must be at most 64, got {}", threshold),
                });
            }
        }

        Ok(())
    }
}
