// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DCT perceptual hash
//!
//! The image is converted to RGB, shrunk by the hasher to a small fixed
//! grid, transformed with a DCT, and the low-frequency 8x8 block is
//! thresholded against its median. The DC term dwarfs every other
//! coefficient, so a mean threshold would leave nearly all bits at 0. The result is stable under recompression,
//! slight resizing and mild colour shifts.

use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use tracing::{debug, warn};

use super::{Fingerprint, FingerprintError};

/// Hash grid edge; 8x8 gives the 64-bit fingerprint
const HASH_EDGE: u32 = 8;

/// Perceptual hash engine
///
/// Pure and deterministic: no state beyond the hasher configuration.
pub struct PerceptualHasher {
    hasher: Hasher,
}

impl std::fmt::Debug for PerceptualHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerceptualHasher")
            .field("bits", &(HASH_EDGE * HASH_EDGE))
            .finish_non_exhaustive()
    }
}

impl PerceptualHasher {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_EDGE, HASH_EDGE)
            .hash_alg(HashAlg::Median)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }

    /// Compute the fingerprint of a decoded image
    pub fn fingerprint(&self, image: &DynamicImage) -> Result<Fingerprint, FingerprintError> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let hash = self.hasher.hash_image(&rgb);

        let bytes = hash.as_bytes();
        let array: [u8; 8] = bytes
            .try_into()
            .map_err(|_| FingerprintError::UnexpectedHashLength(bytes.len()))?;

        let fingerprint = Fingerprint::from_bits(u64::from_be_bytes(array));
        debug!(
            "Computed pHash {} for {}x{} image",
            fingerprint,
            image.width(),
            image.height()
        );
        Ok(fingerprint)
    }

    /// Decode raw image bytes and compute the fingerprint
    pub fn fingerprint_bytes(&self, bytes: &[u8]) -> Result<Fingerprint, FingerprintError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| FingerprintError::Decode(e.to_string()))?;
        self.fingerprint(&image)
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the fingerprint of a decoded image with a default hasher
pub fn compute_fingerprint(image: &DynamicImage) -> Result<Fingerprint, FingerprintError> {
    PerceptualHasher::new().fingerprint(image)
}

/// Compute the hex fingerprint of raw image bytes
///
/// Returns `None` if the bytes cannot be decoded; callers skip the
/// duplicate check in that case.
pub fn compute_fingerprint_from_bytes(bytes: &[u8]) -> Option<String> {
    match PerceptualHasher::new().fingerprint_bytes(bytes) {
        Ok(fingerprint) => Some(fingerprint.to_string()),
        Err(e) => {
            warn!("Failed to compute pHash: {}", e);
            None
        }
    }
}
