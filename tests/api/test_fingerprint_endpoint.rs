// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /fingerprint and POST /duplicates/check

use super::support::*;
use axum::http::StatusCode;
use serde_json::json;
use signwise_recognizer::config::ServiceConfig;
use signwise_recognizer::fingerprint::{compute_fingerprint_from_bytes, hamming_distance};

#[tokio::test]
async fn test_fingerprint_matches_library() {
    let png = png_bytes(96, 64);
    let expected = compute_fingerprint_from_bytes(&png).unwrap();

    let response = send(
        app(None),
        json_request("/fingerprint", json!({ "image_base64": png_base64(96, 64) })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fingerprint"], expected.as_str());
}

#[tokio::test]
async fn test_fingerprint_is_stable_across_calls() {
    let first = body_json(
        send(
            app(None),
            json_request("/fingerprint", json!({ "image_base64": png_base64(50, 50) })),
        )
        .await,
    )
    .await;
    let second = body_json(
        send(
            app(None),
            json_request("/fingerprint", json!({ "image_base64": png_base64(50, 50) })),
        )
        .await,
    )
    .await;

    let a = first["fingerprint"].as_str().unwrap();
    let b = second["fingerprint"].as_str().unwrap();
    assert_eq!(hamming_distance(a, b), 0);
}

#[tokio::test]
async fn test_fingerprint_of_non_image_is_null() {
    let response = send(
        app(None),
        json_request("/fingerprint", json!({ "image_base64": "aGVsbG8=" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["fingerprint"].is_null());
}

#[tokio::test]
async fn test_fingerprint_of_truncated_png_is_null() {
    let png = png_bytes(32, 32);
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        &png[..png.len() / 2],
    );
    let response = send(
        app(None),
        json_request("/fingerprint", json!({ "image_base64": encoded })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["fingerprint"].is_null());
}

#[tokio::test]
async fn test_fingerprint_rejects_bad_base64_and_missing_field() {
    let bad = send(
        app(None),
        json_request("/fingerprint", json!({ "image_base64": "not base64 !!" })),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let missing = send(app(None), json_request("/fingerprint", json!({}))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fingerprint_over_limit_is_413() {
    let config = ServiceConfig {
        max_upload_bytes: 64,
        ..ServiceConfig::default()
    };
    let response = send(
        app_with_config(None, config),
        json_request("/fingerprint", json!({ "image_base64": png_base64(64, 64) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_duplicate_check_first_match_wins() {
    let response = send(
        app(None),
        json_request(
            "/duplicates/check",
            json!({
                "fingerprint": "a1b2c3d4e5f60708",
                "existing_fingerprints": [
                    "ffffffffffffffff",
                    "a1b2c3d4e5f60709",
                    "a1b2c3d4e5f60708"
                ]
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_duplicate"], true);
    assert_eq!(body["matched_fingerprint"], "a1b2c3d4e5f60709");
    assert_eq!(body["distance"], 1);
}

#[tokio::test]
async fn test_duplicate_check_respects_threshold() {
    let response = send(
        app(None),
        json_request(
            "/duplicates/check",
            json!({
                "fingerprint": "0000000000000000",
                "existing_fingerprints": ["000000000000003f"],
                "threshold": 5
            }),
        ),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["is_duplicate"], false);
    assert!(body["matched_fingerprint"].is_null());
}

#[tokio::test]
async fn test_duplicate_check_empty_corpus() {
    let body = body_json(
        send(
            app(None),
            json_request(
                "/duplicates/check",
                json!({ "fingerprint": "a1b2c3d4e5f60708" }),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(body["is_duplicate"], false);
}

#[tokio::test]
async fn test_duplicate_check_rejects_malformed_candidate() {
    let response = send(
        app(None),
        json_request(
            "/duplicates/check",
            json!({ "fingerprint": "zz", "existing_fingerprints": ["a1b2c3d4e5f60708"] }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
