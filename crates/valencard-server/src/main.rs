//! Valencard relay server binary.

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use valencard_server::{AppState, ServerConfig, build_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("valencard_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.bind;
    info!(
        "SMTP {}, Cloudinary {}",
        if config.smtp().is_some() { "configured" } else { "disabled" },
        if config.cloudinary().is_some() { "configured" } else { "disabled" },
    );
    info!("Serving uploads from {}", config.uploads_dir().display());

    let state = Arc::new(AppState::from_config(config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Valencard relay server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
