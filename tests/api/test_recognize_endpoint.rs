// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /recognize
//!
//! Covers the mock fallback contract, detection summaries, duplicate
//! checks against caller-supplied fingerprints and image validation.

use super::support::*;
use axum::http::StatusCode;
use serde_json::json;
use signwise_recognizer::fingerprint::compute_fingerprint_from_bytes;
use signwise_recognizer::vision::InferenceOutput;

#[tokio::test]
async fn test_recognize_without_model_returns_mock() {
    let response = send(
        app(None),
        json_request("/recognize", json!({ "image_base64": png_base64(64, 48) })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["is_mock"], true);
    assert_eq!(body["xp_value"], 10);
    assert!(body["sign_name"].is_string());
    assert!(body["annotated_image"].is_null());

    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.85..0.99).contains(&confidence));
    assert!(body["class_id"].as_u64().unwrap() <= 20);
}

#[tokio::test]
async fn test_recognize_summarises_best_detection() {
    let script = Script::Output(detections(&[
        (12, None, 0.40),
        (8, None, 0.91),
        (0, Some("stop"), 0.91),
    ]));
    let response = send(
        app(Some(script)),
        json_request("/recognize", json!({ "image_base64": png_base64(64, 64) })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_mock"], false);
    assert_eq!(body["class_id"], 8);
    assert_eq!(body["sign_name"], "No Entry");
    assert_eq!(body["category"], "regulatory");

    let all = body["all_detections"].as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["class_name"], "Pedestrian Crossing");
    assert_eq!(all[0]["category"], "warning");
    assert_eq!(all[2]["class_name"], "Stop");
    assert_eq!(all[1]["bbox"]["x1"], 4.0);

    assert!(body["annotated_image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_recognize_without_boxes_is_mock() {
    let response = send(
        app(Some(Script::Output(InferenceOutput::default()))),
        json_request("/recognize", json!({ "image_base64": png_base64(32, 32) })),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["is_mock"], true);
    assert!(body["message"].as_str().unwrap().contains("No traffic signs"));
}

#[tokio::test]
async fn test_recognize_engine_failure_is_mock_with_error() {
    let response = send(
        app(Some(Script::Fail("output tensor missing"))),
        json_request("/recognize", json!({ "image_base64": png_base64(32, 32) })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_mock"], true);
    assert!(body["error"].as_str().unwrap().contains("output tensor missing"));
}

#[tokio::test]
async fn test_recognize_accepts_data_url_and_camel_case() {
    let data_url = format!("data:image/png;base64,{}", png_base64(24, 24));
    let response = send(
        app(None),
        json_request("/recognize", json!({ "imageBase64": data_url })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_recognize_reports_duplicate() {
    let png = png_bytes(64, 64);
    let own = compute_fingerprint_from_bytes(&png).unwrap();
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &png);

    let response = send(
        app(None),
        json_request(
            "/recognize",
            json!({
                "image_base64": encoded,
                "existing_fingerprints": ["not-a-hash", own],
                "duplicate_threshold": 0
            }),
        ),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["image_phash"], own.as_str());
    assert_eq!(body["is_duplicate"], true);
    assert_eq!(body["duplicate_of"], own.as_str());
}

#[tokio::test]
async fn test_recognize_without_corpus_is_not_duplicate() {
    let response = send(
        app(None),
        json_request("/recognize", json!({ "image_base64": png_base64(40, 40) })),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["is_duplicate"], false);
    assert!(body["duplicate_of"].is_null());
    assert_eq!(body["image_phash"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_recognize_rejects_bad_input() {
    let response = send(
        app(None),
        json_request("/recognize", json!({ "image_base64": "@@not base64@@" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "invalid_image");

    let response = send(app(None), json_request("/recognize", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "validation_error");

    // valid base64, not an image
    let response = send(
        app(None),
        json_request("/recognize", json!({ "image_base64": "aGVsbG8gd29ybGQ=" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
