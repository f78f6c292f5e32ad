// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fingerprint API endpoint module
//!
//! Provides POST /fingerprint and POST /duplicates/check.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{duplicate_check_handler, fingerprint_handler};
pub use request::{DuplicateCheckRequest, FingerprintRequest};
pub use response::{DuplicateCheckResponse, FingerprintResponse};
