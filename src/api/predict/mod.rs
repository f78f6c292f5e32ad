// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict API endpoint module
//!
//! Provides POST /predict for multipart uploads. Requires a loaded model.

pub mod handler;

pub use handler::{predict_handler, IMAGE_FIELD};
