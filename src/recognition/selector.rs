// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Best-detection selection

use crate::vision::RawDetection;

/// The detection with the highest confidence
///
/// Ties go to the detection seen first; a NaN score never beats a number.
/// Returns `None` for an empty slice.
pub fn select_best(detections: &[RawDetection]) -> Option<&RawDetection> {
    let mut best: Option<&RawDetection> = None;
    for detection in detections {
        let replace = match best {
            None => true,
            Some(current) => {
                detection.confidence > current.confidence
                    || (current.confidence.is_nan() && !detection.confidence.is_nan())
            }
        };
        if replace {
            best = Some(detection);
        }
    }
    best
}
