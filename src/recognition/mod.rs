// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Traffic-sign recognition
//!
//! Turns raw model output into client responses: picks the best detection,
//! resolves it through the taxonomy, and falls back to a simulated result
//! whenever the model cannot give one.

pub mod builder;
pub mod selector;
pub mod service;
pub mod types;

use thiserror::Error;

use crate::vision::{ImageError, InferenceError};

pub use builder::{build_response, InferenceOutcome, ResponseBuilder, MOCK_CONFIDENCE};
pub use selector::select_best;
pub use service::{RecognizerSettings, SignRecognizer};
pub use types::{round_confidence, PredictionResponse, PredictionResult, RecognitionResponse};

pub use crate::vision::{BoundingBox, Classification, InferenceOutput, RawDetection};

/// Errors of the strict prediction path
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Sign recognition model is not loaded")]
    ModelUnavailable,

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}
