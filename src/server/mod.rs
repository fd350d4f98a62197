//! HTTP serving for incentive recommendations
//!
//! Loads a trained bundle at startup and exposes a health probe plus a
//! single-request recommendation endpoint.

mod error;
mod handlers;
mod state;

pub use error::ServerError;
pub use state::AppState;

use crate::artifact::ModelBundle;
use crate::inference::Recommender;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub const DEFAULT_MODEL_PATH: &str = "artifacts/incentive_recommender.json";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),
        }
    }
}

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/recommend", post(handlers::recommend));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the server with the given configuration.
///
/// Fails before binding when the model artifact cannot be loaded; a
/// serving process without a model is useless.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let bundle = ModelBundle::load(&config.model_path)?;
    let state = Arc::new(AppState::new(Recommender::new(bundle)));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        model_path = %config.model_path.display(),
        started_at = %start_time.to_rfc3339(),
        "Incentive recommendation server starting"
    );
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");
    info!(url = %format!("http://{}/api/recommend", addr), "Recommendation endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_path() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        };
        assert_eq!(
            config.model_path,
            PathBuf::from("artifacts/incentive_recommender.json")
        );
    }
}
