// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /model/reload

use super::support::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use signwise_recognizer::config::ServiceConfig;
use std::io::Write;

fn reload_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/model/reload")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_reload_disabled_by_default() {
    let response = send(app(None), reload_request()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error_type"], "forbidden");
}

#[tokio::test]
async fn test_reload_missing_model_is_500() {
    let config = ServiceConfig {
        allow_model_reload: true,
        model_path: "/nonexistent/signs.onnx".into(),
        ..ServiceConfig::default()
    };
    let response = send(app_with_config(None, config), reload_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_reload_refuses_untrusted_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not really onnx").unwrap();

    let config = ServiceConfig {
        allow_model_reload: true,
        model_path: file.path().to_path_buf(),
        trust_model_source: false,
        model_sha256: None,
        ..ServiceConfig::default()
    };
    let response = send(app_with_config(None, config), reload_request()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reload_refuses_checksum_mismatch() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"tampered model bytes").unwrap();

    let config = ServiceConfig {
        allow_model_reload: true,
        model_path: file.path().to_path_buf(),
        model_sha256: Some("0".repeat(64)),
        ..ServiceConfig::default()
    };
    let response = send(app_with_config(None, config), reload_request()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("checksum"));
}

#[tokio::test]
async fn test_failed_reload_shows_in_health() {
    let config = ServiceConfig {
        allow_model_reload: true,
        model_path: "/nonexistent/signs.onnx".into(),
        ..ServiceConfig::default()
    };
    let app = app_with_config(None, config);

    let response = send(app.clone(), reload_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let health = body_json(send(app, get_request("/health")).await).await;
    assert_eq!(health["status"], "degraded");
    assert!(health["last_error"].as_str().unwrap().contains("not found"));
}
