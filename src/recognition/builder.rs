// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response assembly under partial failure
//!
//! Every inference outcome, including a missing model and a failed model
//! call, ends in a well-formed [`RecognitionResponse`]:
//!
//! | Outcome                         | Response                                   |
//! |---------------------------------|--------------------------------------------|
//! | no model                        | mock                                       |
//! | boxes                           | best box summary + all boxes, not mock     |
//! | no boxes, top-1 classification  | classification summary, not mock, no boxes |
//! | nothing                         | mock                                       |
//! | model call failed               | mock + `error`                             |

use rand::Rng;
use std::ops::Range;
use tracing::{debug, info, warn};

use super::selector::select_best;
use super::types::{PredictionResult, RecognitionResponse};
use crate::taxonomy::{ClassToken, Taxonomy};
use crate::vision::{InferenceOutput, RawDetection};

/// Confidence band for simulated results
pub const MOCK_CONFIDENCE: Range<f32> = 0.85..0.99;

pub const MSG_MODEL_UNAVAILABLE: &str = "Sign model not loaded; result is simulated.";
pub const MSG_NO_DETECTIONS: &str = "No traffic signs detected in the image; result is simulated.";
pub const MSG_FAILED: &str = "Recognition failed; result is simulated.";

/// What happened when the engine was asked to run
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutcome {
    ModelUnavailable,
    Completed(InferenceOutput),
    Failed(String),
}

/// Turns inference outcomes into responses using one taxonomy
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseBuilder {
    taxonomy: Taxonomy,
}

impl ResponseBuilder {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Resolve one raw detection for the client
    pub fn resolve_detection(&self, detection: &RawDetection) -> PredictionResult {
        let token = ClassToken::for_class(detection.class_id, detection.label.as_deref());
        let record = self.taxonomy.resolve(&token);
        debug!(
            "  class {} ('{}') -> {} [{}] conf {:.4} box {:?}",
            detection.class_id,
            token,
            record.name,
            record.category,
            detection.confidence,
            detection.bbox.to_array()
        );
        PredictionResult::new(detection.class_id, record, detection.confidence, Some(detection.bbox))
    }

    /// Build the response for one outcome
    pub fn build<R: Rng>(&self, outcome: InferenceOutcome, rng: &mut R) -> RecognitionResponse {
        match outcome {
            InferenceOutcome::ModelUnavailable => {
                debug!("No sign model loaded, returning mock");
                self.mock(rng, MSG_MODEL_UNAVAILABLE)
            }
            InferenceOutcome::Failed(error) => {
                warn!("Recognition failed, returning mock: {}", error);
                let mut response = self.mock(rng, MSG_FAILED);
                response.error = Some(error);
                response
            }
            InferenceOutcome::Completed(output) => self.summarize(output, rng),
        }
    }

    fn summarize<R: Rng>(&self, output: InferenceOutput, rng: &mut R) -> RecognitionResponse {
        if let Some(best) = select_best(&output.detections) {
            let token = ClassToken::for_class(best.class_id, best.label.as_deref());
            let record = self.taxonomy.resolve(&token);
            info!(
                "✅ Detected {} (class {}) {:.2}% [{}], {} boxes total",
                record.name,
                best.class_id,
                best.confidence * 100.0,
                record.category,
                output.detections.len()
            );

            let all: Vec<PredictionResult> = output
                .detections
                .iter()
                .map(|d| self.resolve_detection(d))
                .collect();

            let mut response =
                RecognitionResponse::from_record(best.class_id, record, best.confidence, false);
            response.all_detections = Some(all);
            return response;
        }

        if let Some(top) = output.classification {
            let token = ClassToken::for_class(top.class_id, top.label.as_deref());
            let record = self.taxonomy.resolve(&token);
            info!(
                "✅ Classified as {} (class {}) {:.2}%",
                record.name,
                top.class_id,
                top.confidence * 100.0
            );
            return RecognitionResponse::from_record(top.class_id, record, top.confidence, false);
        }

        info!("⚠️ No signs detected, returning mock");
        self.mock(rng, MSG_NO_DETECTIONS)
    }

    /// Simulated result from a uniformly random table entry
    pub fn mock<R: Rng>(&self, rng: &mut R, message: &str) -> RecognitionResponse {
        let (class_id, record) = self.taxonomy.random_index_entry(rng);
        let confidence = rng.gen_range(MOCK_CONFIDENCE);
        debug!("🎲 Mock sign: {} ({:.2})", record.name, confidence);

        let mut response = RecognitionResponse::from_record(class_id, record, confidence, true);
        response.message = Some(message.to_string());
        response
    }
}

/// Build a response straight from raw detections
///
/// With `model_available = false` the detections are ignored and the
/// response is always a mock.
pub fn build_response(
    raw_detections: &[RawDetection],
    taxonomy: &Taxonomy,
    model_available: bool,
) -> RecognitionResponse {
    let outcome = if model_available {
        InferenceOutcome::Completed(InferenceOutput::from_detections(raw_detections.to_vec()))
    } else {
        InferenceOutcome::ModelUnavailable
    };
    ResponseBuilder::new(*taxonomy).build(outcome, &mut rand::thread_rng())
}
