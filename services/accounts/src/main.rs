use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod password;
mod rate_limiter;
mod repositories;
mod routes;
mod rpc;
mod service;
mod settings;

use common::client::AuthClient;
use common::{cache, database};
use sqlx::migrate::Migrator;

use crate::rate_limiter::RateLimiter;
use crate::repositories::{SessionRepository, UserRepository};
use crate::rpc::LocalAuthClient;
use crate::service::AuthService;
use crate::settings::Settings;

/// Embedded schema migrations, applied on startup
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AuthService,
    pub auth_client: Arc<dyn AuthClient>,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting accounts service");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &MIGRATOR).await?;

    // Initialize Redis connection pool
    let redis_config = cache::RedisConfig::from_env()?;
    let redis_pool = cache::RedisPool::new(&redis_config).await?;

    // Check cache connectivity
    if redis_pool.health_check().await? {
        info!("Redis connection successful");
    } else {
        anyhow::bail!("Failed to connect to Redis");
    }

    let users = UserRepository::new(pool);
    let sessions = SessionRepository::new(redis_pool, settings.session.ttl_seconds);
    let service = AuthService::new(Arc::new(users), Arc::new(sessions));

    info!("Accounts service initialized successfully");

    // Sibling services resolve sessions and profiles over a separate listener
    let rpc_router = rpc::create_rpc_router(service.clone());
    let rpc_addr = settings.rpc.bind_addr.clone();
    tokio::spawn(async move {
        let listener = match tokio::net::TcpListener::bind(&rpc_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind RPC listener on {}: {}", rpc_addr, e);
                std::process::exit(1);
            }
        };
        info!("Accounts RPC listening on {}", rpc_addr);
        if let Err(e) = axum::serve(listener, rpc_router).await {
            error!("RPC server failed: {}", e);
            std::process::exit(1);
        }
    });

    let app_state = AppState {
        service: service.clone(),
        auth_client: Arc::new(LocalAuthClient::new(service)),
        rate_limiter: RateLimiter::new(settings.rate_limit.to_config()),
    };

    // Start the web server
    let cors = routes::cors_layer(&settings.cors.allowed_origin)?;
    let app = routes::create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&settings.http.bind_addr).await?;
    info!("Accounts service listening on {}", settings.http.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
