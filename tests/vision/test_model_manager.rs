// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sign model manager tests
//!
//! Lifecycle and trust checks run everywhere. Tests that need a real
//! exported YOLO model are `#[ignore]`d and read `SIGN_MODEL_PATH`.

use signwise_recognizer::vision::model_manager::{sha256_file, verify_trust};
use signwise_recognizer::vision::{
    InferenceEngine, ModelConfig, ModelError, ModelManager, ModelMode, ModelTrust,
};
use std::io::Write;
use std::path::PathBuf;

fn temp_model(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

fn real_model_path() -> Option<PathBuf> {
    std::env::var("SIGN_MODEL_PATH").ok().map(PathBuf::from)
}

#[cfg(test)]
mod model_manager_tests {
    use super::*;

    #[test]
    fn test_default_config_is_untrusted_detect() {
        let config = ModelConfig::default();
        assert_eq!(config.trust, ModelTrust::Untrusted);
        assert_eq!(config.mode, ModelMode::Detect);
        assert_eq!(config.input_size, 640);
        assert!(config.labels_path.is_none());
    }

    #[test]
    fn test_missing_model_degrades() {
        let manager = ModelManager::load(ModelConfig {
            model_path: "/nonexistent/best.onnx".into(),
            trust: ModelTrust::Trusted,
            ..ModelConfig::default()
        });

        assert!(!manager.is_loaded());
        assert!(manager.engine().is_none());
        let status = manager.status();
        assert!(!status.loaded);
        assert!(status.last_error.unwrap().contains("not found"));
    }

    #[test]
    fn test_untrusted_file_is_refused() {
        let file = temp_model(b"onnx?");
        let err = verify_trust(file.path(), &ModelTrust::Untrusted).unwrap_err();
        assert!(matches!(err, ModelError::Untrusted(_)));
    }

    #[test]
    fn test_checksum_decides_trust() {
        let file = temp_model(b"sign model weights");
        let digest = sha256_file(file.path()).unwrap();
        assert_eq!(digest.len(), 64);

        assert!(verify_trust(file.path(), &ModelTrust::Checksum(digest.to_uppercase())).is_ok());

        let err = verify_trust(file.path(), &ModelTrust::Checksum("00".repeat(32))).unwrap_err();
        assert!(matches!(err, ModelError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_trusted_garbage_fails_at_runtime_not_trust() {
        let file = temp_model(b"definitely not a protobuf");
        let manager = ModelManager::unloaded(ModelConfig {
            model_path: file.path().to_path_buf(),
            trust: ModelTrust::Trusted,
            ..ModelConfig::default()
        });

        let err = manager.reload().unwrap_err();
        assert!(matches!(err, ModelError::Runtime(_)));
        assert!(!manager.is_loaded());
    }

    #[test]
    #[ignore = "requires SIGN_MODEL_PATH pointing at an exported YOLO ONNX model"]
    fn test_real_model_loads_and_infers() {
        let Some(path) = real_model_path() else {
            return;
        };

        let manager = ModelManager::load(ModelConfig {
            model_path: path,
            trust: ModelTrust::Trusted,
            ..ModelConfig::default()
        });
        assert!(manager.is_loaded(), "{:?}", manager.status().last_error);

        let engine = manager.engine().unwrap();
        let image = image::DynamicImage::new_rgb8(320, 240);
        let output = engine.infer(&image, 0.25).unwrap();
        for detection in &output.detections {
            assert!(detection.confidence >= 0.25);
            assert!(detection.bbox.x2 <= 320.0 && detection.bbox.y2 <= 240.0);
        }
        assert!(engine.class_count() > 0);
    }
}
