//! Server binary: loads configuration, connects to PostgreSQL, ensures the
//! schema, and serves the API.

use axum::http::HeaderValue;
use axum::Router;
use dealership_api::{car_routes, common_routes, ensure_schema, AppConfig, AppState, PgCarStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dealership_api=info".parse()?),
        )
        .init();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    ensure_schema(&pool).await?;

    let mut origins: Vec<HeaderValue> = Vec::new();
    for origin in &config.cors_origins {
        origins.push(origin.parse()?);
    }
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    let store = Arc::new(PgCarStore::new(pool));
    let port = config.server_port;
    let state = AppState {
        store: store.clone(),
        identity: store,
        config: Arc::new(config),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(car_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
