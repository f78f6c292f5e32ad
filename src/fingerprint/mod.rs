// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Perceptual fingerprints for near-duplicate image detection
//!
//! This module provides:
//! - A 64-bit DCT perceptual hash (`PerceptualHasher`)
//! - Hamming-distance matching against a caller-owned corpus (`find_duplicate`)
//!
//! Fingerprints are not persisted here. Whoever owns the corpus (per user,
//! per session or global) hands in a consistent snapshot on every call.

pub mod matcher;
pub mod phash;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use matcher::{
    check_duplicate, find_duplicate, hamming_distance, DuplicateCheck, DEFAULT_DUPLICATE_THRESHOLD,
};
pub use phash::{compute_fingerprint, compute_fingerprint_from_bytes, PerceptualHasher};

/// Number of bits in a fingerprint
pub const FINGERPRINT_BITS: u32 = 64;

/// Length of the canonical hex form
pub const FINGERPRINT_HEX_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Failed to decode image for fingerprinting: {0}")]
    Decode(String),

    #[error("Perceptual hash produced {0} bytes, expected 8")]
    UnexpectedHashLength(usize),

    #[error("Invalid fingerprint '{0}': expected 16 hex characters")]
    Malformed(String),
}

/// A 64-bit perceptual image fingerprint
///
/// Canonically serialized as 16 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Number of differing bits between two fingerprints
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_HEX_LEN {
            return Err(FingerprintError::Malformed(s.to_string()));
        }

        let bytes = hex::decode(s).map_err(|_| FingerprintError::Malformed(s.to_string()))?;
        let array: [u8; 8] = bytes
            .try_into()
            .map_err(|_| FingerprintError::Malformed(s.to_string()))?;

        Ok(Self(u64::from_be_bytes(array)))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
