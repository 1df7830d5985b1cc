use dotenvy::dotenv;
use hotel_api::{AppState, config::AppConfig, create_app, seed_demo};
use hotel_core::{
    Cache, DocumentStore,
    adapters::{InMemoryCache, InMemoryDocumentStore, PostgresDocumentStore, RedisCache},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn connect_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, BoxError> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            info!("Connected to Postgres document store");
            let store = PostgresDocumentStore::new(pool);
            // A half-migrated schema is not safe to serve from
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::default()))
        }
    }
}

async fn connect_cache(config: &AppConfig) -> Result<Arc<dyn Cache>, BoxError> {
    match &config.redis_url {
        Some(url) => Ok(Arc::new(
            RedisCache::new(url, config.session_ttl_seconds).await?,
        )),
        None => {
            warn!("REDIS_URL not set, using the in-memory cache");
            Ok(Arc::new(InMemoryCache::new(
                10_000,
                config.session_ttl_seconds,
            )))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load environment (.env) if present
    dotenv().ok();
    let config = AppConfig::from_env()?;

    // RUST_LOG wins over LOG_FILTER
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting hotel API v{}...", env!("CARGO_PKG_VERSION"));

    let store = connect_store(&config).await?;
    let cache = connect_cache(&config).await?;

    let mut app_state = AppState::new(store, cache);
    app_state.stats_ttl_seconds = config.stats_cache_ttl_seconds;
    app_state.session_ttl_seconds = config.session_ttl_seconds;

    if config.seed_demo_data {
        seed_demo(&app_state).await?;
    }

    let app = create_app(app_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Hotel API listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
