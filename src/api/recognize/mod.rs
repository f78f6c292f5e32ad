// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognize API endpoint module
//!
//! Provides POST /recognize for sign recognition with mock fallback.

pub mod handler;
pub mod request;

pub use handler::recognize_handler;
pub use request::RecognizeRequest;
