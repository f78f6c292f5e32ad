// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! GET /, GET /health, GET /classes

use super::support::*;
use axum::http::StatusCode;
use signwise_recognizer::vision::InferenceOutput;

#[tokio::test]
async fn test_health_degraded_without_model() {
    let response = send(app(None), get_request("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
    assert!(body["model_classes"].is_null());
    assert_eq!(body["model_mode"], "detect");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_healthy_with_model() {
    let app = app(Some(Script::Output(InferenceOutput::default())));
    let body = body_json(send(app, get_request("/health")).await).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["model_classes"], 21);
    assert_eq!(body["model_name"], "fake-signs.onnx");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let body = body_json(send(app(None), get_request("/")).await).await;

    assert_eq!(body["status"], "running");
    assert_eq!(body["model_loaded"], false);
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e == "POST /recognize"));
    assert!(endpoints.iter().any(|e| e == "POST /predict"));
}

#[tokio::test]
async fn test_classes_lists_integer_table() {
    let body = body_json(send(app(None), get_request("/classes")).await).await;

    assert_eq!(body["count"], 21);
    let classes = body["classes"].as_array().unwrap();
    assert_eq!(classes.len(), 21);
    assert_eq!(classes[0]["class_id"], 0);
    assert_eq!(classes[0]["name"], "Stop Sign");
    assert_eq!(classes[14]["category"], "construction");
    assert_eq!(classes[20]["name"], "Parking");
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let response = send(app(None), get_request("/recognize")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
