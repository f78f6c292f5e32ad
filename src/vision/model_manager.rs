// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sign model lifecycle
//!
//! The process holds at most one inference engine. It is loaded once at
//! startup; if loading fails the service keeps running in a documented
//! degraded state (mock responses) until an operator triggers a reload.
//! A reload builds the new engine completely before swapping it in, so
//! in-flight requests keep the engine they started with.
//!
//! Loading a model file is a supply-chain trust decision: exported models
//! are executable graphs from whoever produced them. The caller must state
//! that decision explicitly with [`ModelTrust`]; nothing here overrides a
//! safety default behind the caller's back.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

use super::detector::{InferenceEngine, ModelMode};
use super::postprocessing::DEFAULT_IOU_THRESHOLD;
use super::preprocessing::YOLO_INPUT_SIZE;
use super::yolo::{load_labels, model_file_name, YoloOnnxModel, YoloOptions};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    #[error("Refusing to load {0}: model source is not trusted (set TRUST_MODEL_SOURCE or MODEL_SHA256)")]
    Untrusted(PathBuf),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load labels: {0}")]
    Labels(String),

    #[error("Failed to initialise model runtime: {0}")]
    Runtime(String),
}

/// Explicit trust decision for a model file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelTrust {
    /// No decision made; loading is refused
    Untrusted,
    /// The operator vouches for the file's origin
    Trusted,
    /// Load only if the file's SHA-256 matches (hex, case-insensitive)
    Checksum(String),
}

/// Where and how to load the sign model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub labels_path: Option<PathBuf>,
    pub mode: ModelMode,
    pub input_size: u32,
    pub iou_threshold: f32,
    pub trust: ModelTrust,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/best.onnx"),
            labels_path: None,
            mode: ModelMode::Detect,
            input_size: YOLO_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            trust: ModelTrust::Untrusted,
        }
    }
}

/// Snapshot of the model handle for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub model_name: Option<String>,
    pub model_mode: ModelMode,
    pub model_classes: Option<usize>,
    /// Unix seconds of the last successful load
    pub loaded_at: Option<u64>,
    pub last_error: Option<String>,
}

struct Slot {
    engine: Option<Arc<dyn InferenceEngine>>,
    loaded_at: Option<u64>,
    last_error: Option<String>,
}

/// Owner of the process-wide inference engine
pub struct ModelManager {
    config: ModelConfig,
    slot: RwLock<Slot>,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelManager {
    /// Load the configured model, falling back to the degraded state on failure
    pub fn load(config: ModelConfig) -> Self {
        let manager = Self::unloaded(config);
        if let Err(e) = manager.reload() {
            warn!("⚠️ Sign model unavailable, serving mock results: {}", e);
        }
        manager
    }

    /// Manager with no engine (degraded state)
    pub fn unloaded(config: ModelConfig) -> Self {
        Self {
            config,
            slot: RwLock::new(Slot {
                engine: None,
                loaded_at: None,
                last_error: None,
            }),
        }
    }

    /// Manager around an already-built engine
    pub fn with_engine(config: ModelConfig, engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            config,
            slot: RwLock::new(Slot {
                engine: Some(engine),
                loaded_at: Some(unix_now()),
                last_error: None,
            }),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The current engine, if one is loaded
    pub fn engine(&self) -> Option<Arc<dyn InferenceEngine>> {
        self.read_slot().engine.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().engine.is_some()
    }

    pub fn status(&self) -> ModelStatus {
        let slot = self.read_slot();
        ModelStatus {
            loaded: slot.engine.is_some(),
            model_name: slot.engine.as_ref().map(|e| e.name().to_string()),
            model_mode: slot
                .engine
                .as_ref()
                .map(|e| e.mode())
                .unwrap_or(self.config.mode),
            model_classes: slot.engine.as_ref().map(|e| e.class_count()),
            loaded_at: slot.loaded_at,
            last_error: slot.last_error.clone(),
        }
    }

    /// Load the configured model again and swap it in
    ///
    /// Blocks while the model is read and the runtime session is built. On
    /// failure the current engine (if any) stays in place.
    pub fn reload(&self) -> Result<ModelStatus, ModelError> {
        match load_engine(&self.config) {
            Ok(engine) => {
                {
                    let mut slot = self.write_slot();
                    slot.engine = Some(engine);
                    slot.loaded_at = Some(unix_now());
                    slot.last_error = None;
                }
                Ok(self.status())
            }
            Err(e) => {
                self.write_slot().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_engine(config: &ModelConfig) -> Result<Arc<dyn InferenceEngine>, ModelError> {
    let model_bytes = read_trusted_model(&config.model_path, &config.trust)?;

    let labels = match &config.labels_path {
        Some(path) => load_labels(path).map_err(|e| ModelError::Labels(format!("{:#}", e)))?,
        None => Vec::new(),
    };

    let options = YoloOptions {
        mode: config.mode,
        input_size: config.input_size,
        iou_threshold: config.iou_threshold,
        ..YoloOptions::default()
    };

    let model = YoloOnnxModel::from_bytes(
        model_file_name(&config.model_path),
        &model_bytes,
        labels,
        options,
    )
    .map_err(|e| ModelError::Runtime(format!("{:#}", e)))?;

    Ok(Arc::new(model))
}

/// Read a model file once and check the trust decision against those bytes
///
/// The returned bytes are the ones that were hashed; the session must be
/// built from them rather than by reopening the path.
pub fn read_trusted_model(path: &Path, trust: &ModelTrust) -> Result<Vec<u8>, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    if *trust == ModelTrust::Untrusted {
        return Err(ModelError::Untrusted(path.to_path_buf()));
    }

    let model_bytes = std::fs::read(path)?;

    match trust {
        ModelTrust::Checksum(expected) => {
            let actual = sha256_hex(&model_bytes);
            if actual.eq_ignore_ascii_case(expected.trim()) {
                info!("Model checksum verified: {}", actual);
            } else {
                return Err(ModelError::ChecksumMismatch {
                    expected: expected.trim().to_ascii_lowercase(),
                    actual,
                });
            }
        }
        _ => info!("Loading {} on operator trust", path.display()),
    }

    Ok(model_bytes)
}

/// Check the trust decision for a model file before anything parses it
pub fn verify_trust(path: &Path, trust: &ModelTrust) -> Result<(), ModelError> {
    read_trusted_model(path, trust).map(|_| ())
}

/// Lowercase hex SHA-256 of a byte buffer
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Lowercase hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
