// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every setting is a command-line flag with an environment fallback.
//! `main` loads `.env` before parsing.

use clap::{ArgAction, Parser};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

use crate::fingerprint::DEFAULT_DUPLICATE_THRESHOLD;
use crate::recognition::RecognizerSettings;
use crate::vision::model_manager::ModelConfig;
use crate::vision::{ModelMode, ModelTrust, MAX_IMAGE_SIZE};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("max_upload_bytes must be greater than zero")]
    ZeroUploadLimit,

    #[error("duplicate_threshold must be at most 64 bits, got {0}")]
    DuplicateThresholdTooLarge(u32),

    #[error("input_size must be a positive multiple of 32, got {0}")]
    InvalidInputSize(u32),

    #[error("MODEL_SHA256 must be 64 hex characters")]
    InvalidChecksum,
}

/// SignWise recognition service
#[derive(Parser, Debug, Clone)]
#[command(name = "signwise-recognizer")]
#[command(version)]
#[command(about = "Traffic-sign recognition service", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// ONNX sign model
    #[arg(long, env = "MODEL_PATH", default_value = "./models/best.onnx")]
    pub model_path: PathBuf,

    /// Class labels, one per line, in class-id order
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    #[arg(long, env = "MODEL_MODE", value_enum, default_value_t = ModelMode::Detect)]
    pub model_mode: ModelMode,

    /// Operator vouches for the model file's origin
    #[arg(long, env = "TRUST_MODEL_SOURCE", default_value_t = false, action = ArgAction::Set)]
    pub trust_model_source: bool,

    /// Expected SHA-256 of the model file; takes precedence over TRUST_MODEL_SOURCE
    #[arg(long, env = "MODEL_SHA256")]
    pub model_sha256: Option<String>,

    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    #[arg(long = "input-size", env = "MODEL_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,

    /// Maximum Hamming distance for a duplicate match
    #[arg(long, env = "DUPLICATE_THRESHOLD", default_value_t = DEFAULT_DUPLICATE_THRESHOLD)]
    pub duplicate_threshold: u32,

    /// Return annotated images from /recognize
    #[arg(long, env = "ANNOTATE_IMAGES", default_value_t = true, action = ArgAction::Set)]
    pub annotate: bool,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:3001,http://localhost:3002,http://localhost:3003,http://localhost:3004"
    )]
    pub allowed_origins: Vec<String>,

    /// Enable POST /model/reload
    #[arg(long, env = "ALLOW_MODEL_RELOAD", default_value_t = false, action = ArgAction::Set)]
    pub allow_model_reload: bool,
}

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:3003",
    "http://localhost:3004",
];

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            model_path: PathBuf::from("./models/best.onnx"),
            labels_path: None,
            model_mode: ModelMode::Detect,
            trust_model_source: false,
            model_sha256: None,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            input_size: 640,
            max_upload_bytes: MAX_IMAGE_SIZE,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            annotate: true,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            allow_model_reload: false,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }

        if self.duplicate_threshold > 64 {
            return Err(ConfigError::DuplicateThresholdTooLarge(self.duplicate_threshold));
        }

        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(ConfigError::InvalidInputSize(self.input_size));
        }

        if let Some(checksum) = &self.model_sha256 {
            if checksum.len() != 64 || !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidChecksum);
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Trust decision for the model file
    pub fn model_trust(&self) -> ModelTrust {
        match &self.model_sha256 {
            Some(checksum) => ModelTrust::Checksum(checksum.to_ascii_lowercase()),
            None if self.trust_model_source => ModelTrust::Trusted,
            None => ModelTrust::Untrusted,
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            mode: self.model_mode,
            input_size: self.input_size,
            iou_threshold: self.iou_threshold,
            trust: self.model_trust(),
        }
    }

    pub fn recognizer_settings(&self) -> RecognizerSettings {
        RecognizerSettings {
            confidence_threshold: self.confidence_threshold,
            duplicate_threshold: self.duplicate_threshold,
            annotate: self.annotate,
            max_image_bytes: self.max_upload_bytes,
        }
    }

    /// Request body limit for JSON routes carrying base64 images
    pub fn json_body_limit(&self) -> usize {
        // base64 inflates by 4/3, plus room for the fingerprint list
        self.max_upload_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(1024 * 1024)
    }
}
