// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for traffic-sign images
//!
//! This module provides:
//! - Image decoding and validation (`image_utils`)
//! - The inference engine contract and its YOLO/ONNX implementation
//! - Model lifecycle with explicit trust decisions (`model_manager`)
//! - Detection overlays (`annotate`)
//!
//! Inference runs on CPU only.

pub mod annotate;
pub mod detector;
pub mod image_utils;
pub mod model_manager;
pub mod postprocessing;
pub mod preprocessing;
pub mod yolo;

pub use annotate::annotate_detections;
pub use detector::{
    BoundingBox, Classification, InferenceEngine, InferenceError, InferenceOutput, ModelMode,
    RawDetection,
};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo, MAX_IMAGE_SIZE,
};
pub use model_manager::{ModelConfig, ModelError, ModelManager, ModelStatus, ModelTrust};
pub use yolo::{YoloOnnxModel, YoloOptions};
