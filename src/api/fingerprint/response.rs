// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fingerprint response types

use serde::{Deserialize, Serialize};

/// Fingerprint of an image; `None` when hashing failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintResponse {
    pub fingerprint: Option<String>,
}

// Duplicate checks answer with `fingerprint::DuplicateCheck` directly
pub use crate::fingerprint::DuplicateCheck as DuplicateCheckResponse;
