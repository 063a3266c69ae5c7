use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credit_risk_form::config::Config;
use credit_risk_form::handlers::{self, AppState};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The classifier artifact (startup halts if it is missing).
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk_form=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Load the classifier once; nothing is served without it
    let port = config.port;
    let app_state = match AppState::load(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Startup aborted: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!(
        "Classifier ready: {} (sha256 {})",
        app_state.model.path,
        app_state.model.sha256
    );
    tracing::info!(
        "Prediction history: {}",
        app_state.history.path().display()
    );

    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
