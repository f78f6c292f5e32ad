// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /predict
//!
//! Strict variant: no mocks, errors map to 400/413/500/503.

use super::support::*;
use axum::http::StatusCode;
use signwise_recognizer::config::ServiceConfig;
use signwise_recognizer::vision::{Classification, InferenceOutput};

#[tokio::test]
async fn test_predict_without_model_is_503() {
    let response = send(
        app(None),
        multipart_request("image", "image/png", &png_bytes(32, 32)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "service_unavailable");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_predict_returns_sorted_predictions() {
    let script = Script::Output(detections(&[(3, None, 0.3), (0, None, 0.8), (9, None, 0.55)]));
    let response = send(
        app(Some(script)),
        multipart_request("image", "image/png", &png_bytes(80, 60)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["image_size"], serde_json::json!([80, 60]));
    assert!(body["inference_time_ms"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["image_phash"].as_str().unwrap().len(), 16);

    let names: Vec<&str> = body["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["class_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Stop Sign", "No Parking", "Speed Limit 30"]);
}

#[tokio::test]
async fn test_predict_empty_result_has_message() {
    let response = send(
        app(Some(Script::Output(InferenceOutput::default()))),
        multipart_request("image", "image/png", &png_bytes(16, 16)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["predictions"], serde_json::json!([]));
    assert_eq!(body["message"], "No traffic signs detected in the image.");
}

#[tokio::test]
async fn test_predict_classification_has_null_bbox() {
    let output = InferenceOutput::from_classification(Classification {
        class_id: 14,
        label: None,
        confidence: 0.72,
    });
    let response = send(
        app(Some(Script::Output(output))),
        multipart_request("image", "image/png", &png_bytes(16, 16)),
    )
    .await;

    let body = body_json(response).await;
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0]["class_name"], "Road Work");
    assert_eq!(predictions[0]["category"], "construction");
    assert!(predictions[0]["bbox"].is_null());
}

#[tokio::test]
async fn test_predict_rejects_non_image_upload() {
    let script = Script::Output(InferenceOutput::default());
    let response = send(
        app(Some(script)),
        multipart_request("image", "text/plain", b"hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_requires_image_field() {
    let script = Script::Output(InferenceOutput::default());
    let response = send(
        app(Some(script)),
        multipart_request("photo", "image/png", &png_bytes(8, 8)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_rejects_unreadable_image() {
    let script = Script::Output(InferenceOutput::default());
    let response = send(
        app(Some(script)),
        multipart_request("image", "image/jpeg", b"\xff\xd8\xff\xe0 truncated"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_over_limit_is_413() {
    let config = ServiceConfig {
        max_upload_bytes: 64,
        ..ServiceConfig::default()
    };
    let script = Script::Output(InferenceOutput::default());
    let response = send(
        app_with_config(Some(script), config),
        multipart_request("image", "image/png", &png_bytes(64, 64)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_predict_engine_failure_is_500() {
    let response = send(
        app(Some(Script::Fail("session crashed"))),
        multipart_request("image", "image/png", &png_bytes(16, 16)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("session crashed"));
}
