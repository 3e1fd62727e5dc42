//! Student Depression Risk API
//!
//! Scores a student questionnaire for depression risk.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DEPRESSION RISK API                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  startup (once)                                             │
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  Dataset  │─▶│ Preprocess   │─▶│ Classifier + Weights │ │
//! │  │  (CSV)    │  │ fit          │  │ fit                  │ │
//! │  └───────────┘  └──────────────┘  └──────────┬───────────┘ │
//! │                                              ▼              │
//! │                                   ┌──────────────────────┐ │
//! │  per request                      │ Arc<ModelBundle>     │ │
//! │  ┌───────────┐  ┌──────────────┐  │ (read-only)          │ │
//! │  │  API      │─▶│ Questionnaire│─▶│ transform, classify, │ │
//! │  │  (Axum)   │  │ sanitize     │  │ score                │ │
//! │  └───────────┘  └──────────────┘  └──────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod logic;
mod models;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
    http::HeaderValue,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::dataset;
use logic::ModelBundle;
pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "depression_risk_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("Depression Risk API starting ({})...", config.environment);
    tracing::info!("Dataset: {}", config.dataset_path);

    // Fit once, before accepting requests
    let (data, source) = dataset::load_or_synthetic(&config.dataset_path)
        .context("Failed to load training data")?;
    let bundle = ModelBundle::fit(&data, source, &config.bundle_options())
        .context("Failed to fit model")?;

    if bundle.data_source().is_synthetic() && config.is_production() {
        tracing::warn!("Serving a model trained on synthetic data in production");
    }

    let state = AppState {
        bundle: Arc::new(bundle),
        config: Arc::new(config),
    };

    let app = create_router(state.clone());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub config: Arc<config::Config>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/api/predict", post(handlers::predict::predict))
        .route("/predict", post(handlers::predict::predict))
        .route("/model-info", get(handlers::model_info::info))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}
