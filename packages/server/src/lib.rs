//! Taskboard HTTP Server
//!
//! This crate exposes the task module's handlers as a REST API under
//! `/api/tasks`, and provides [`RouterClient`], a `TasksApi` implementation
//! that drives the same router with real HTTP requests.
//!
//! # Architecture
//!
//! The router is assembled from endpoint modules via `.merge()`:
//! - `catalog_endpoints`: tags, partners, categories, clients, work hours
//! - `task_endpoints`: health check and task endpoints
//!
//! All handlers share one [`TasksBackend`] behind an async mutex, so each
//! request runs its handler to completion before the next one starts.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin taskboard-server
//!
//! # Custom port, empty store
//! TASKBOARD_PORT=3002 TASKBOARD_SEED=false cargo run --bin taskboard-server
//! ```
//!
//! # Security
//!
//! - CORS restricted to the configured origins
//! - No authentication

use axum::{
    http::{header, Method, Uri},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use taskboard_core::TasksBackend;

mod catalog_endpoints;
mod task_endpoints;

pub mod client;
pub mod config;
pub mod http_error;

pub use catalog_endpoints::catalog_routes;
pub use client::RouterClient;
pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;
pub use task_endpoints::HealthStatus;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Mutex<TasksBackend>>,
}

impl AppState {
    pub fn new(backend: TasksBackend) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Seeded or empty backend, as the configuration asks
    pub fn from_config(config: &ServerConfig) -> Self {
        if config.seed {
            Self::new(TasksBackend::seeded())
        } else {
            Self::new(TasksBackend::default())
        }
    }
}

/// Create the application router with all endpoint modules
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(task_endpoints::routes(state.clone()))
        .merge(catalog_endpoints::routes(state))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route(uri: Uri) -> HttpError {
    HttpError::new(format!("No route for {}", uri.path()), http_error::NOT_FOUND)
}

/// Create CORS layer for the configured origins
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ConfigError> {
    Ok(CorsLayer::new()
        .allow_origin(config.origin_headers()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(false))
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns error if the configuration is invalid or the server fails to
/// bind or start.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = AppState::from_config(&config);
    let app = create_router(state).layer(cors_layer(&config)?);

    let addr = config.bind_address();
    tracing::info!("🚀 Taskboard server starting on http://{}", addr);
    tracing::info!("📡 CORS enabled for {}", config.cors_origins.join(", "));
    if config.seed {
        tracing::info!("🌱 Serving the demo dataset");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
