use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scamwatch_api::config::Config;
use scamwatch_api::db::Database;
use scamwatch_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scamwatch_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("Configuration loaded successfully");

    // Initialize database connections
    let db = Database::connect(&config).await?;
    tracing::info!("Database connections established");

    // Run database migrations
    db.run_migrations().await?;

    // Build application state
    let state = AppState::new(db, config.clone())?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
