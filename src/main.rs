//! Blog backend server.
//!
//! Serves the blog REST API over flat-file JSON storage.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blog_backend::config::Config;
use blog_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blog backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Images directory: {:?}", config.images_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    let state = AppState::open(&config).await?;
    tracing::info!("Operator account: {:?}", state.auth.login());

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
