// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for router tests
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use signwise_recognizer::{
    api::{create_app, AppState},
    config::ServiceConfig,
    vision::{
        BoundingBox, InferenceEngine, InferenceError, InferenceOutput, ModelManager, ModelMode,
        RawDetection,
    },
};
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt;

pub enum Script {
    Output(InferenceOutput),
    Fail(&'static str),
}

/// Engine that replays a fixed result
pub struct FakeEngine {
    pub script: Script,
}

impl InferenceEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake-signs.onnx"
    }

    fn mode(&self) -> ModelMode {
        ModelMode::Detect
    }

    fn class_count(&self) -> usize {
        21
    }

    fn labels(&self) -> &[String] {
        &[]
    }

    fn infer(&self, _: &DynamicImage, _: f32) -> Result<InferenceOutput, InferenceError> {
        match &self.script {
            Script::Output(output) => Ok(output.clone()),
            Script::Fail(msg) => Err(InferenceError::Session(msg.to_string())),
        }
    }
}

pub fn detections(items: &[(u32, Option<&str>, f32)]) -> InferenceOutput {
    InferenceOutput::from_detections(
        items
            .iter()
            .map(|(class_id, label, confidence)| RawDetection {
                class_id: *class_id,
                label: label.map(str::to_string),
                confidence: *confidence,
                bbox: BoundingBox::new(4.0, 4.0, 40.0, 36.0),
            })
            .collect(),
    )
}

pub fn app(script: Option<Script>) -> Router {
    app_with_config(script, ServiceConfig::default())
}

pub fn app_with_config(script: Option<Script>, config: ServiceConfig) -> Router {
    let models = match script {
        Some(script) => ModelManager::with_engine(
            config.model_config(),
            Arc::new(FakeEngine { script }),
        ),
        None => ModelManager::unloaded(config.model_config()),
    };
    create_app(Arc::new(AppState::new(config, Arc::new(models))))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([220, 30, 30])
        } else {
            Rgb([250, 250, 250])
        }
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(png_bytes(width, height))
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "signwise-test-boundary";

/// Single-file multipart request
pub fn multipart_request(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
