// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO sign model on ONNX Runtime
//!
//! Runs an exported YOLOv8-style detection or classification model on CPU.
//! The ONNX session is held behind a mutex, so concurrent requests are
//! serialised at the session.

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::detector::{InferenceEngine, InferenceError, InferenceOutput, ModelMode};
use super::postprocessing::{decode_classification, decode_detections, DEFAULT_IOU_THRESHOLD};
use super::preprocessing::{preprocess_for_classification, preprocess_for_detection, YOLO_INPUT_SIZE};

/// Load options for [`YoloOnnxModel`]
#[derive(Debug, Clone)]
pub struct YoloOptions {
    pub mode: ModelMode,
    pub input_size: u32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
}

impl Default for YoloOptions {
    fn default() -> Self {
        Self {
            mode: ModelMode::Detect,
            input_size: YOLO_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            intra_threads: 4,
        }
    }
}

#[derive(Clone)]
pub struct YoloOnnxModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    name: String,
    labels: Vec<String>,
    /// Labels count until the first inference reveals the real output width
    class_count: Arc<AtomicUsize>,
    options: YoloOptions,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("class_count", &self.class_count)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl YoloOnnxModel {
    /// Load an exported model file
    ///
    /// `labels` are the class names in class-id order; pass an empty vector
    /// when the model ships none.
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime cannot build a
    /// session from it.
    pub fn load<P: AsRef<Path>>(model_path: P, labels: Vec<String>, options: YoloOptions) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Sign model not found: {}", model_path.display());
        }

        let model_bytes = std::fs::read(model_path)
            .with_context(|| format!("Failed to read sign model {}", model_path.display()))?;

        Self::from_bytes(model_file_name(model_path), &model_bytes, labels, options)
    }

    /// Build a session from model bytes already in memory
    ///
    /// Used after the bytes have been checked against a trust decision, so
    /// the graph that runs is exactly the one that was verified.
    pub fn from_bytes(
        name: String,
        model_bytes: &[u8],
        labels: Vec<String>,
        options: YoloOptions,
    ) -> Result<Self> {
        info!(
            "Loading sign model {} ({} bytes, {} mode)",
            name,
            model_bytes.len(),
            options.mode
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(options.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_memory(model_bytes)
            .with_context(|| format!("Failed to load sign model {}", name))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(output) = session.outputs.first() {
            debug!("Sign model output type: {:?}", output.output_type);
        }

        info!("✅ Sign model {} loaded with {} labels (CPU-only)", name, labels.len());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            name,
            class_count: Arc::new(AtomicUsize::new(labels.len())),
            labels,
            options,
        })
    }

    /// Class count implied by an output shape
    fn classes_from_shape(shape: &[usize], mode: ModelMode) -> Option<usize> {
        match (mode, shape) {
            (ModelMode::Detect, [_, a, b]) => {
                // [1, 4 + nc, anchors] with anchors >> nc
                let features = (*a).min(*b);
                features.checked_sub(4).filter(|nc| *nc > 0)
            }
            (ModelMode::Classify, [_, classes]) if *classes > 0 => Some(*classes),
            _ => None,
        }
    }

    fn record_class_count(&self, shape: &[usize]) {
        if let Some(classes) = Self::classes_from_shape(shape, self.options.mode) {
            let previous = self.class_count.swap(classes, Ordering::Relaxed);
            if previous != classes && !self.labels.is_empty() {
                tracing::warn!(
                    "⚠️ Labels file has {} entries but model scores {} classes",
                    self.labels.len(),
                    classes
                );
            }
        }
    }

    fn run(&self, input: ndarray::Array4<f32>) -> Result<ndarray::ArrayD<f32>, InferenceError> {
        let mut session = self.session.lock().map_err(|_| InferenceError::LockPoisoned)?;

        let input_value =
            Value::from_array(input).map_err(|e| InferenceError::Session(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| InferenceError::Session(e.to_string()))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?;

        Ok(output.to_owned())
    }
}

impl InferenceEngine for YoloOnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> ModelMode {
        self.options.mode
    }

    fn class_count(&self) -> usize {
        self.class_count.load(Ordering::Relaxed)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn infer(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<InferenceOutput, InferenceError> {
        let start = Instant::now();

        let output = match self.options.mode {
            ModelMode::Detect => {
                let (tensor, geometry) = preprocess_for_detection(image, self.options.input_size);
                let raw = self.run(tensor)?;
                debug!("Detection output shape: {:?}", raw.shape());
                self.record_class_count(raw.shape());
                let detections = decode_detections(
                    raw.view(),
                    confidence_threshold,
                    self.options.iou_threshold,
                    &geometry,
                    &self.labels,
                )?;
                InferenceOutput::from_detections(detections)
            }
            ModelMode::Classify => {
                let tensor = preprocess_for_classification(image, self.options.input_size);
                let raw = self.run(tensor)?;
                debug!("Classification output shape: {:?}", raw.shape());
                self.record_class_count(raw.shape());
                match decode_classification(raw.view(), &self.labels)? {
                    Some(top) if top.confidence >= confidence_threshold => {
                        InferenceOutput::from_classification(top)
                    }
                    _ => InferenceOutput::default(),
                }
            }
        };

        debug!(
            "Model {} ran in {:.1}ms: {} boxes, classification: {}",
            self.name,
            start.elapsed().as_secs_f64() * 1000.0,
            output.detections.len(),
            output.classification.is_some()
        );

        Ok(output)
    }
}

/// Read class labels, one per line, in class-id order
///
/// Blank lines and `#` comments are skipped. A `<id>: <label>` or
/// `<id> <label>` prefix is stripped, so YOLO `names` dumps load unchanged.
/// Display name for a model file (its file name)
pub fn model_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;
    Ok(parse_labels(&content))
}

pub fn parse_labels(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let stripped = match line.split_once(|c: char| c == ':' || c.is_whitespace()) {
                Some((id, rest)) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
                    rest.trim()
                }
                _ => line,
            };
            stripped.trim_matches(|c| c == '"' || c == '\'').to_string()
        })
        .collect()
}
