// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod fingerprint;
pub mod recognition;
pub mod taxonomy;
pub mod version;
pub mod vision;

pub use config::ServiceConfig;
pub use fingerprint::{check_duplicate, compute_fingerprint, find_duplicate, hamming_distance, Fingerprint};
pub use recognition::{build_response, select_best, RecognitionResponse, SignRecognizer};
pub use taxonomy::{ClassToken, SignCategory, SignRecord, Taxonomy};
pub use vision::{InferenceEngine, ModelManager};
