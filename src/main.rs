//! Tourbook HTTP service.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tourbook::adapters::cache::{InMemoryCache, RedisCache};
use tourbook::adapters::http::{app_router, SystemToken};
use tourbook::adapters::notifications::LoggingNotificationSender;
use tourbook::adapters::payment_authority::{AuthorityConfig, HttpPaymentAuthority};
use tourbook::bootstrap::{build_state, Repositories};
use tourbook::config::{AppConfig, DatabaseConfig, PaymentConfig, RedisConfig, ServerConfig};
use tourbook::ports::KeyValueCache;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let repositories = match &config.database {
        Some(database) => Repositories::postgres(connect_database(database).await?),
        None => {
            tracing::warn!("No database configured, using in-memory repositories");
            Repositories::in_memory()
        }
    };
    let cache = connect_cache(config.redis.as_ref()).await?;
    let authority = Arc::new(HttpPaymentAuthority::new(authority_config(&config.payment))?);
    if config.server.system_token.is_none() {
        tracing::warn!("No system token configured, system booking endpoints are closed");
    }

    let state = build_state(
        repositories,
        cache,
        authority,
        Arc::new(LoggingNotificationSender::new()),
        SystemToken::from_config(config.server.system_token.as_ref()),
        &config.cache,
    );
    let app = app_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Tourbook listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Tourbook stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn connect_database(config: &DatabaseConfig) -> Result<sqlx::PgPool, BoxError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    Ok(pool)
}

async fn connect_cache(config: Option<&RedisConfig>) -> Result<Arc<dyn KeyValueCache>, BoxError> {
    match config {
        Some(redis) => {
            let cache =
                tokio::time::timeout(redis.connect_timeout(), RedisCache::connect(&redis.url))
                    .await??
                    .with_prefix(redis.key_prefix.clone());
            tracing::info!("Connected to Redis");
            Ok(Arc::new(cache))
        }
        None => {
            tracing::warn!("No Redis configured, caches are local to this process");
            Ok(Arc::new(InMemoryCache::new()))
        }
    }
}

fn authority_config(payment: &PaymentConfig) -> AuthorityConfig {
    AuthorityConfig::new(payment.access_token.expose_secret().clone())
        .with_base_url(payment.base_url.clone())
        .with_timeout(payment.timeout())
        .with_max_retries(payment.max_retries)
        .with_base_backoff(payment.backoff())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
