// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sign recognition service
//!
//! Orchestrates one request: decode, fingerprint, optional duplicate check,
//! inference on a blocking thread, response assembly and annotation.

use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::builder::{InferenceOutcome, ResponseBuilder};
use super::types::{PredictionResponse, PredictionResult, RecognitionResponse};
use super::RecognitionError;
use crate::fingerprint::{check_duplicate, compute_fingerprint, DEFAULT_DUPLICATE_THRESHOLD};
use crate::taxonomy::{ClassToken, Taxonomy};
use crate::vision::image_utils::decode_image_bytes_with_limit;
use crate::vision::{
    annotate_detections, ImageError, InferenceEngine, InferenceError, InferenceOutput, ModelManager,
    MAX_IMAGE_SIZE,
};

pub const MSG_NO_SIGNS: &str = "No traffic signs detected in the image.";

/// Per-service tuning
#[derive(Debug, Clone)]
pub struct RecognizerSettings {
    pub confidence_threshold: f32,
    pub duplicate_threshold: u32,
    pub annotate: bool,
    pub max_image_bytes: usize,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            annotate: true,
            max_image_bytes: MAX_IMAGE_SIZE,
        }
    }
}

/// Recognition entry point shared by all handlers
pub struct SignRecognizer {
    models: Arc<ModelManager>,
    builder: ResponseBuilder,
    settings: RecognizerSettings,
}

impl std::fmt::Debug for SignRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignRecognizer")
            .field("models", &self.models)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SignRecognizer {
    pub fn new(models: Arc<ModelManager>, taxonomy: Taxonomy, settings: RecognizerSettings) -> Self {
        Self {
            models,
            builder: ResponseBuilder::new(taxonomy),
            settings,
        }
    }

    pub fn models(&self) -> &Arc<ModelManager> {
        &self.models
    }

    pub fn settings(&self) -> &RecognizerSettings {
        &self.settings
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        self.builder.taxonomy()
    }

    /// Recognize the sign in an encoded image
    ///
    /// Only an unreadable image is an error; a missing model, an empty
    /// result or a failed model call all produce a response.
    pub async fn recognize(&self, image_bytes: &[u8]) -> Result<RecognitionResponse, ImageError> {
        self.recognize_against(image_bytes, &[], None).await
    }

    /// [`recognize`](Self::recognize), also checking the image against known fingerprints
    ///
    /// `existing` is the caller's corpus snapshot for this call.
    pub async fn recognize_against(
        &self,
        image_bytes: &[u8],
        existing: &[String],
        duplicate_threshold: Option<u32>,
    ) -> Result<RecognitionResponse, ImageError> {
        let start = Instant::now();
        let (image, info) = decode_image_bytes_with_limit(image_bytes, self.settings.max_image_bytes)?;
        let image = Arc::new(image);
        debug!("📷 Processing image: {}x{} ({:?})", info.width, info.height, info.format);

        let engine = self.models.engine();
        let (fingerprint, outcome) = self.fingerprint_and_infer(image.clone(), engine).await;

        let mut response = self.builder.build(outcome, &mut rand::thread_rng());

        if let Some(hash) = fingerprint {
            let threshold = duplicate_threshold.unwrap_or(self.settings.duplicate_threshold);
            let check = check_duplicate(&hash, existing, threshold);
            response.is_duplicate = check.is_duplicate;
            response.duplicate_of = check.matched_fingerprint;
            response.image_phash = Some(hash);
        }

        if self.settings.annotate && !response.is_mock {
            response.annotated_image = self.annotate(image, &response).await;
        }

        info!(
            "📸 Recognition complete | {:.1}ms | {}x{} | {} boxes | mock: {}",
            start.elapsed().as_secs_f64() * 1000.0,
            info.width,
            info.height,
            response.all_detections.as_ref().map(Vec::len).unwrap_or(0),
            response.is_mock
        );

        Ok(response)
    }

    /// Strict prediction: every failure is an error, never a mock
    pub async fn predict(&self, image_bytes: &[u8]) -> Result<PredictionResponse, RecognitionError> {
        let (image, info) = decode_image_bytes_with_limit(image_bytes, self.settings.max_image_bytes)?;
        let engine = self.models.engine().ok_or(RecognitionError::ModelUnavailable)?;

        let image = Arc::new(image);
        let confidence = self.settings.confidence_threshold;
        let task_image = image.clone();

        let (fingerprint, inference, elapsed_ms) = tokio::task::spawn_blocking(move || {
            let fingerprint = compute_fingerprint(&task_image);
            let start = Instant::now();
            let inference = engine.infer(&task_image, confidence);
            (fingerprint, inference, start.elapsed().as_secs_f64() * 1000.0)
        })
        .await
        .map_err(|e| InferenceError::TaskFailed(e.to_string()))?;

        let output = inference?;
        let mut predictions = self.predictions(output);
        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let image_phash = match fingerprint {
            Ok(fp) => Some(fp.to_hex()),
            Err(e) => {
                warn!("Failed to compute pHash: {}", e);
                None
            }
        };

        info!(
            "📸 Inference complete | {:.2}ms | {}x{} | {} predictions",
            elapsed_ms,
            info.width,
            info.height,
            predictions.len()
        );

        Ok(PredictionResponse {
            success: true,
            message: predictions.is_empty().then(|| MSG_NO_SIGNS.to_string()),
            predictions,
            inference_time_ms: (elapsed_ms * 100.0).round() / 100.0,
            image_size: [info.width, info.height],
            image_phash,
        })
    }

    fn predictions(&self, output: InferenceOutput) -> Vec<PredictionResult> {
        if !output.detections.is_empty() {
            return output
                .detections
                .iter()
                .map(|d| self.builder.resolve_detection(d))
                .collect();
        }

        output
            .classification
            .map(|top| {
                let token = ClassToken::for_class(top.class_id, top.label.as_deref());
                let record = self.taxonomy().resolve(&token);
                vec![PredictionResult::new(top.class_id, record, top.confidence, None)]
            })
            .unwrap_or_default()
    }

    /// Fingerprint and inference on one blocking task
    ///
    /// A fingerprint failure only disables the duplicate check. Engine
    /// errors and panics become [`InferenceOutcome::Failed`].
    async fn fingerprint_and_infer(
        &self,
        image: Arc<DynamicImage>,
        engine: Option<Arc<dyn InferenceEngine>>,
    ) -> (Option<String>, InferenceOutcome) {
        let confidence = self.settings.confidence_threshold;

        let task = tokio::task::spawn_blocking(move || {
            let fingerprint = match compute_fingerprint(&image) {
                Ok(fp) => Some(fp.to_hex()),
                Err(e) => {
                    warn!("Failed to compute pHash, skipping duplicate check: {}", e);
                    None
                }
            };

            let outcome = match engine {
                None => InferenceOutcome::ModelUnavailable,
                Some(engine) => match engine.infer(&image, confidence) {
                    Ok(output) => InferenceOutcome::Completed(output),
                    Err(e) => InferenceOutcome::Failed(e.to_string()),
                },
            };

            (fingerprint, outcome)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                let error = InferenceError::TaskFailed(e.to_string());
                (None, InferenceOutcome::Failed(error.to_string()))
            }
        }
    }

    async fn annotate(&self, image: Arc<DynamicImage>, response: &RecognitionResponse) -> Option<String> {
        let boxes = response.annotation_boxes();
        let task = tokio::task::spawn_blocking(move || annotate_detections(&image, &boxes));

        match task.await {
            Ok(Ok(url)) => {
                debug!("Annotated image generated ({} chars)", url.len());
                Some(url)
            }
            Ok(Err(e)) => {
                warn!("Failed to generate annotated image: {}", e);
                None
            }
            Err(e) => {
                warn!("Annotation task failed: {}", e);
                None
            }
        }
    }
}
