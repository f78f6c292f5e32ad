// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference engine contract
//!
//! Every engine returns the same typed shape: a list of boxes, plus an
//! optional whole-image top-1 classification for models that classify
//! instead of detect. Callers never probe the engine for optional fields.

use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model session error: {0}")]
    Session(String),

    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),

    #[error("Model session lock poisoned")]
    LockPoisoned,

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}

/// What the loaded model produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelMode {
    /// Bounding boxes, `[1, 4 + classes, anchors]` output
    Detect,
    /// Whole-image scores, `[1, classes]` output
    Classify,
}

impl fmt::Display for ModelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelMode::Detect => f.write_str("detect"),
            ModelMode::Classify => f.write_str("classify"),
        }
    }
}

/// Axis-aligned box in source-image pixels, `(x1, y1, x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// One box straight from the model, before taxonomy lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: u32,
    /// Model's own label for the class, if it ships one
    pub label: Option<String>,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Whole-image top-1 result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub class_id: u32,
    pub label: Option<String>,
    pub confidence: f32,
}

/// Result of one inference call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceOutput {
    pub detections: Vec<RawDetection>,
    pub classification: Option<Classification>,
}

impl InferenceOutput {
    pub fn from_detections(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            classification: None,
        }
    }

    pub fn from_classification(classification: Classification) -> Self {
        Self {
            detections: Vec::new(),
            classification: Some(classification),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty() && self.classification.is_none()
    }
}

/// A loaded sign model
///
/// Implementations may serialise calls internally; `infer` blocks for the
/// duration of model execution and should run off the async executor.
pub trait InferenceEngine: Send + Sync {
    /// Human-readable model identifier (usually the file name)
    fn name(&self) -> &str;

    fn mode(&self) -> ModelMode;

    /// Number of classes the model scores
    fn class_count(&self) -> usize;

    /// Labels shipped with the model, indexed by class id (may be empty)
    fn labels(&self) -> &[String];

    /// Model label for a class id, if the model shipped one
    fn label_for(&self, class_id: u32) -> Option<&str> {
        self.labels()
            .get(class_id as usize)
            .map(String::as_str)
            .filter(|label| !label.trim().is_empty())
    }

    /// Run the model on an RGB image, dropping results under `confidence_threshold`
    fn infer(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<InferenceOutput, InferenceError>;
}
