//! cargodesk server entry point

use cargodesk::api;
use cargodesk::config::Config;
use cargodesk::db;
use cargodesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cargodesk=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting cargodesk (env: {})", config.environment);

    let pool = db::connect(&config.database_path).await?;
    let state = AppState::new(pool, &config);

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("cargodesk HTTP listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
