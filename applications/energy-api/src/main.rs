use energy_api::{create_pool, routes, Config};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded, database at {}", config.database.path);
    if config.api_key.is_none() {
        warn!("API_KEY not set, API endpoints are open");
    }

    // Create database pool
    let pool = create_pool(&config).await?;
    info!("Database connection pool created");

    // Initialize repositories and services
    let repository = energy_api::repositories::ConsumptionRepository::new(pool);
    let service = energy_api::services::ConsumptionService::new(repository);

    // Create router
    let app = routes::create_router(service, config.clone());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
