// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hamming-distance duplicate matching
//!
//! Distance 0 means identical, under 5 is visually near-identical, under 10
//! is similar but not necessarily a duplicate.
//!
//! The scan is linear and stops at the first stored fingerprint within the
//! threshold (first found, not closest). Corpora are expected to be small
//! (per user or per session).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Fingerprint, FINGERPRINT_BITS};

/// Maximum Hamming distance treated as a duplicate
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 5;

/// Outcome of a duplicate scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    /// The stored fingerprint that matched, exactly as supplied
    pub matched_fingerprint: Option<String>,
    /// Distance to the match, if any
    pub distance: Option<u32>,
}

impl DuplicateCheck {
    fn miss() -> Self {
        Self {
            is_duplicate: false,
            matched_fingerprint: None,
            distance: None,
        }
    }
}

/// Hamming distance between two hex fingerprints
///
/// A malformed fingerprint on either side yields the maximal distance (64),
/// so one corrupt stored hash can never match or abort a scan.
pub fn hamming_distance(hash1: &str, hash2: &str) -> u32 {
    match (hash1.parse::<Fingerprint>(), hash2.parse::<Fingerprint>()) {
        (Ok(a), Ok(b)) => a.distance(&b),
        _ => {
            debug!(
                "Malformed fingerprint in comparison ('{}' vs '{}'), using max distance",
                hash1, hash2
            );
            FINGERPRINT_BITS
        }
    }
}

/// Scan `corpus` in order for a fingerprint within `threshold` of `candidate`
pub fn check_duplicate<S: AsRef<str>>(candidate: &str, corpus: &[S], threshold: u32) -> DuplicateCheck {
    if candidate.is_empty() || corpus.is_empty() {
        return DuplicateCheck::miss();
    }

    let Ok(candidate) = candidate.parse::<Fingerprint>() else {
        debug!("Malformed candidate fingerprint '{}', skipping duplicate scan", candidate);
        return DuplicateCheck::miss();
    };

    for existing in corpus {
        let existing = existing.as_ref();
        // Malformed stored hashes sit at max distance and never match
        let Ok(stored) = existing.parse::<Fingerprint>() else {
            continue;
        };
        let distance = candidate.distance(&stored);
        if distance <= threshold {
            info!(
                "🔄 Duplicate detected! Hamming distance: {} (threshold: {})",
                distance, threshold
            );
            return DuplicateCheck {
                is_duplicate: true,
                matched_fingerprint: Some(existing.to_string()),
                distance: Some(distance),
            };
        }
    }

    DuplicateCheck::miss()
}

/// Tuple form of [`check_duplicate`]: `(is_duplicate, matched)`
pub fn find_duplicate<S: AsRef<str>>(
    candidate: &str,
    corpus: &[S],
    threshold: u32,
) -> (bool, Option<String>) {
    let check = check_duplicate(candidate, corpus, threshold);
    (check.is_duplicate, check.matched_fingerprint)
}
