//! Churn Risk Scorer - Main Entry Point
//!
//! Loads the preprocessor and scoring model once, then serves the scoring
//! form until interrupted.

use anyhow::{Context, Result};
use churn_risk_scorer::{
    config::{AppConfig, LoggingConfig},
    metrics::ScoringMetrics,
    models::ArtifactLoader,
    scoring::ScoringContext,
    web::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    init_logging(&config.logging)?;
    info!("Starting Churn Risk Scorer");
    info!(
        artifacts_dir = %config.artifacts.dir,
        bind = %config.server.bind,
        "Configuration loaded successfully"
    );

    // Nothing is served unless both artifacts load
    let loader = ArtifactLoader::from_config(&config.artifacts)?;
    let artifacts = match loader.load() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!(path = %e.path().display(), "{}", e);
            return Err(e.into());
        }
    };

    let context = Arc::new(ScoringContext::from(artifacts));
    info!(
        backend = %context.backend_kind(),
        features = context.preprocessor().n_features_out(),
        "Scoring context ready"
    );

    let metrics = Arc::new(ScoringMetrics::new());
    let app = web::router(AppState {
        context,
        metrics: metrics.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Serving scoring form on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Scorer shutting down...");
    metrics.log_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
