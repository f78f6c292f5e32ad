// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client-facing recognition records

use serde::{Deserialize, Serialize};

use crate::taxonomy::{SignCategory, SignRecord};
use crate::vision::BoundingBox;

/// Points awarded per recognised sign
pub const DEFAULT_XP_VALUE: u32 = 10;

/// Round to 4 decimal places for per-detection reporting
pub fn round_confidence(confidence: f32) -> f32 {
    (confidence * 10_000.0).round() / 10_000.0
}

/// One resolved detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_id: u32,
    pub class_name: String,
    pub category: SignCategory,
    pub description: String,
    pub rules: String,
    /// Rounded to 4 decimal places
    pub confidence: f32,
    /// Absent for whole-image classifications
    pub bbox: Option<BoundingBox>,
}

impl PredictionResult {
    pub fn new(class_id: u32, record: SignRecord, confidence: f32, bbox: Option<BoundingBox>) -> Self {
        Self {
            class_id,
            class_name: record.name,
            category: record.category,
            description: record.description,
            rules: record.rules,
            confidence: round_confidence(confidence),
            bbox,
        }
    }
}

/// Response of the recognize operation
///
/// `is_mock = true` means the summary fields came from a random table entry,
/// not from the model. It is never a protocol error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub success: bool,
    pub sign_name: Option<String>,
    pub category: Option<SignCategory>,
    pub description: Option<String>,
    pub rules: Option<String>,
    /// Unrounded confidence of the best match
    pub confidence: f32,
    pub class_id: Option<u32>,
    pub xp_value: u32,
    /// JPEG data URL with detection outlines
    pub annotated_image: Option<String>,
    pub all_detections: Option<Vec<PredictionResult>>,
    pub image_phash: Option<String>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub is_mock: bool,
}

impl RecognitionResponse {
    /// Successful response summarising `record`
    pub fn from_record(class_id: u32, record: SignRecord, confidence: f32, is_mock: bool) -> Self {
        Self {
            success: true,
            sign_name: Some(record.name),
            category: Some(record.category),
            description: Some(record.description),
            rules: Some(record.rules),
            confidence,
            class_id: Some(class_id),
            xp_value: DEFAULT_XP_VALUE,
            annotated_image: None,
            all_detections: None,
            image_phash: None,
            is_duplicate: false,
            duplicate_of: None,
            error: None,
            message: None,
            is_mock,
        }
    }

    /// Boxes to outline on the annotated image
    pub fn annotation_boxes(&self) -> Vec<(BoundingBox, SignCategory)> {
        self.all_detections
            .iter()
            .flatten()
            .filter_map(|d| d.bbox.map(|bbox| (bbox, d.category)))
            .collect()
    }
}

/// Response of the strict predict operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    /// Highest confidence first
    pub predictions: Vec<PredictionResult>,
    pub inference_time_ms: f64,
    /// `[width, height]`
    pub image_size: [u32; 2],
    pub image_phash: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SignRecord {
        SignRecord {
            name: "Yield Sign".to_string(),
            category: SignCategory::Regulatory,
            description: "Yield to other traffic.".to_string(),
            rules: "Slow down and give way to other vehicles.".to_string(),
        }
    }

    #[test]
    fn test_round_confidence() {
        assert_eq!(round_confidence(0.912_345), 0.9123);
        assert_eq!(round_confidence(0.999_99), 1.0);
        assert_eq!(round_confidence(0.0), 0.0);
    }

    #[test]
    fn test_prediction_rounds_confidence() {
        let p = PredictionResult::new(1, record(), 0.876_54, None);
        assert_eq!(p.confidence, 0.8765);
        assert_eq!(p.class_name, "Yield Sign");
    }

    #[test]
    fn test_response_json_shape() {
        let response = RecognitionResponse::from_record(1, record(), 0.91, false);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["sign_name"], "Yield Sign");
        assert_eq!(json["category"], "regulatory");
        assert_eq!(json["xp_value"], 10);
        assert_eq!(json["is_mock"], false);
        assert!(json["all_detections"].is_null());
        assert!(json["annotated_image"].is_null());
        assert_eq!(json["is_duplicate"], false);
    }

    #[test]
    fn test_annotation_boxes_skip_unboxed() {
        let mut response = RecognitionResponse::from_record(1, record(), 0.9, false);
        response.all_detections = Some(vec![
            PredictionResult::new(1, record(), 0.9, Some(BoundingBox::new(0.0, 0.0, 5.0, 5.0))),
            PredictionResult::new(1, record(), 0.8, None),
        ]);
        assert_eq!(response.annotation_boxes().len(), 1);
    }
}
