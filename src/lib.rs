//! Property listings service.
//!
//! Signed-in users add rental listings through a multipart form: the
//! submission is authenticated, decoded, its images are pushed to an image
//! host, and the assembled listing is stored in a document database.
//! Anyone can list listings or fetch one by id.

pub mod auth;
pub mod config;
pub mod error;
pub mod form;
pub mod images;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod store;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::Config;
use state::AppState;

/// Largest accepted request body; listings carry several photos
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// All HTTP routes over shared state
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/properties",
            get(routes::list_properties).post(routes::create_property),
        )
        .route("/api/properties/{id}", get(routes::get_property))
        .route("/api/auth/session", get(routes::current_session))
        .route("/api/auth/signin/google", get(routes::google_sign_in))
        .route(auth::google::CALLBACK_PATH, get(routes::google_callback))
        .route("/api/auth/signout", post(routes::sign_out))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config)?;

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
