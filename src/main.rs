use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portfolio_api::app::{router, AppState};
use portfolio_api::config::config;
use portfolio_api::database::DatabaseManager;
use portfolio_api::is_production;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Portfolio API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is empty; protected routes will reject every token");
    }

    // Lazy so the server can come up (and report degraded health) before Postgres does
    let pool = DatabaseManager::connect_lazy(&config.database).context("invalid database configuration")?;
    if let Err(e) = DatabaseManager::health_check(&pool).await {
        tracing::warn!("Database not reachable at startup: {}", e);
    }

    let app = router(AppState::from_pool(pool, config), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
