//! Taskboard HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin taskboard-server
//!
//! TASKBOARD_PORT=3002 RUST_LOG=debug cargo run --bin taskboard-server
//! ```
//!
//! # Environment Variables
//!
//! - `TASKBOARD_PORT`: Server port (default: 3001)
//! - `TASKBOARD_SEED`: Start from the demo dataset (default: true)
//! - `CORS_ALLOW_ORIGIN`: Comma-separated allowed origins
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use taskboard_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 Taskboard Server");
    tracing::info!("==================================");

    let config = ServerConfig::from_env()?;
    tracing::info!("📡 Port: {}", config.port);

    start_server(config).await?;

    Ok(())
}
