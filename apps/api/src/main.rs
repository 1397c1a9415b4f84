mod config;
mod errors;
mod models;
mod normalize;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::normalize::{Pipeline, RawDocument};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume normalizer v{}", env!("CARGO_PKG_VERSION"));

    // Keyword tables: built-in, or KEYWORDS_PATH override
    let pipeline_config = config.pipeline_config()?;
    let pipeline = Pipeline::new(&pipeline_config).context("Invalid pipeline configuration")?;
    let keywords = config
        .keywords_path
        .as_deref()
        .map_or("built-in".to_string(), |p| p.display().to_string());
    info!(
        keywords = %keywords,
        max_upload_bytes = config.max_upload_bytes,
        "Pipeline initialized"
    );

    // `normalizer <file>` normalizes one local file and prints the result instead of serving.
    if let Some(path) = std::env::args_os().nth(1) {
        return normalize_file(&pipeline, PathBuf::from(path)).await;
    }

    let state = AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn normalize_file(pipeline: &Pipeline, path: PathBuf) -> Result<()> {
    let raw = RawDocument::from_path(&path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let output = pipeline.run(&raw)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "source_format": output.format,
            "document": output.document,
            "validation": output.validation,
        }))?
    );
    Ok(())
}
