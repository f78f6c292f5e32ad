// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLO output tensors

use ndarray::{ArrayViewD, IxDyn};

use super::detector::{BoundingBox, Classification, InferenceError, RawDetection};
use super::preprocessing::Letterbox;

/// Default IoU above which same-class boxes are merged
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Decode a detection head output into source-pixel boxes
///
/// Accepts `[1, 4 + classes, anchors]` (the usual export) or its transpose.
/// Each anchor keeps its highest-scoring class; anchors below
/// `confidence_threshold` are dropped, then class-aware NMS is applied.
pub fn decode_detections(
    output: ArrayViewD<f32>,
    confidence_threshold: f32,
    iou_threshold: f32,
    geometry: &Letterbox,
    labels: &[String],
) -> Result<Vec<RawDetection>, InferenceError> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "detection output shape {:?}, expected [1, 4 + classes, anchors]",
            shape
        )));
    }

    let channels_first = shape[1] <= shape[2];
    let (features, anchors) = if channels_first {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };

    if features < 5 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "detection output has {} features per anchor, expected at least 5",
            features
        )));
    }

    let value = |feature: usize, anchor: usize| -> f32 {
        if channels_first {
            output[IxDyn(&[0, feature, anchor])]
        } else {
            output[IxDyn(&[0, anchor, feature])]
        }
    };

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::MIN;
        for class in 0..features - 4 {
            let score = value(4 + class, anchor);
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }

        if !best_score.is_finite() || best_score < confidence_threshold {
            continue;
        }

        let cx = value(0, anchor);
        let cy = value(1, anchor);
        let w = value(2, anchor);
        let h = value(3, anchor);

        let (x1, y1) = geometry.to_source(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = geometry.to_source(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawDetection {
            class_id: best_class as u32,
            label: labels.get(best_class).cloned(),
            confidence: best_score,
            bbox: BoundingBox::new(x1, y1, x2, y2),
        });
    }

    Ok(non_max_suppression(candidates, iou_threshold))
}

/// Greedy class-aware NMS; output is ordered by confidence, highest first
pub fn non_max_suppression(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for detection in detections {
        let suppressed = kept.iter().any(|k| {
            k.class_id == detection.class_id && k.bbox.iou(&detection.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(detection);
        }
    }
    kept
}

/// Decode a `[1, classes]` classification output to its top-1 class
///
/// Scores outside `0..=1` are treated as logits and softmaxed first.
/// Ties go to the lower class id.
pub fn decode_classification(
    output: ArrayViewD<f32>,
    labels: &[String],
) -> Result<Option<Classification>, InferenceError> {
    let shape = output.shape();
    if shape.is_empty() || shape[0] != 1 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "classification output shape {:?}, expected [1, classes]",
            shape
        )));
    }

    let mut scores: Vec<f32> = output.iter().copied().collect();
    if scores.is_empty() {
        return Ok(None);
    }

    if scores.iter().any(|s| !(0.0..=1.0).contains(s)) {
        softmax(&mut scores);
    }

    let mut best = 0usize;
    for (class, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = class;
        }
    }

    Ok(Some(Classification {
        class_id: best as u32,
        label: labels.get(best).cloned(),
        confidence: scores[best],
    }))
}

fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::MIN, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}
