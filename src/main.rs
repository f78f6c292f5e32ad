// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use signwise_recognizer::{
    api::{start_server, AppState},
    config::ServiceConfig,
    version,
    vision::ModelManager,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🚀 Starting SignWise Traffic Sign Recognition...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = ServiceConfig::parse();
    config.validate().context("Invalid configuration")?;

    info!(
        "🧠 Loading sign model from {} (mode: {}, input: {}px)",
        config.model_path.display(),
        config.model_mode,
        config.input_size
    );

    let model_config = config.model_config();
    let models = tokio::task::spawn_blocking(move || ModelManager::load(model_config))
        .await
        .context("Model loading task failed")?;

    if models.is_loaded() {
        let status = models.status();
        info!(
            "✅ Model ready: {} ({} classes)",
            status.model_name.unwrap_or_default(),
            status.model_classes.unwrap_or(0)
        );
    } else {
        warn!("⚠️ No model loaded, /recognize will return simulated results and /predict will answer 503");
    }

    info!(
        "⚙️ confidence {:.2}, duplicate threshold {}, annotate {}, upload limit {} bytes",
        config.confidence_threshold,
        config.duplicate_threshold,
        config.annotate,
        config.max_upload_bytes
    );

    let state = Arc::new(AppState::new(config, Arc::new(models)));
    start_server(state).await
}
