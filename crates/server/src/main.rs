use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use fayda_ocr::{IdPipeline, OcrBackend};

mod config;
mod routes;

pub struct AppState {
    pub pipeline: IdPipeline<Box<dyn OcrBackend>>,
    /// Kept alongside the pipeline for the standalone blur check endpoint.
    pub sharpness_threshold: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::load().context("failed to load configuration")?;

    let pipeline = IdPipeline::new(build_recognizer(&config))
        .with_sharpness_threshold(config.sharpness_threshold);
    let state = Arc::new(AppState {
        pipeline,
        sharpness_threshold: config.sharpness_threshold,
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("fayda-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &config::Config) -> Box<dyn OcrBackend> {
    use fayda_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Box::new(TesseractRecognizer::new(
        config.tessdata_path.clone(),
        &config.ocr_languages,
    ))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_config: &config::Config) -> Box<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature — recognition will return no lines");
    Box::new(fayda_ocr::MockRecognizer::new(""))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
