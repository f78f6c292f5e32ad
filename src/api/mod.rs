// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod fingerprint;
pub mod handlers;
pub mod http_server;
pub mod predict;
pub mod recognize;

pub use errors::{ApiError, ErrorResponse};
pub use fingerprint::{
    duplicate_check_handler, fingerprint_handler, DuplicateCheckRequest, DuplicateCheckResponse,
    FingerprintRequest, FingerprintResponse,
};
pub use handlers::{ClassesResponse, HealthResponse, ServiceInfo};
pub use http_server::{create_app, start_server, AppState};
pub use predict::predict_handler;
pub use recognize::{recognize_handler, RecognizeRequest};
