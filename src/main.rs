//! CFArena - Application Entry Point
//!
//! This is the main entry point for the CFArena server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cfarena::{
    config::CONFIG,
    db,
    handlers,
    judge::CodeforcesClient,
    middleware::logging::logging_middleware,
    services::{sweep_service, ContestLocks, SubmissionMonitor},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CFArena server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&CONFIG.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection (notification sink)
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(CONFIG.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    // External judge feed client
    let judge = Arc::new(CodeforcesClient::new(&CONFIG.judge)?);

    // Scoring locks and submission poller supervisor
    let locks = ContestLocks::new();
    let monitor = SubmissionMonitor::new(
        db_pool.clone(),
        redis_conn.clone(),
        judge.clone(),
        locks.clone(),
        CONFIG.monitor.clone(),
    );

    // Create application state
    let state = AppState::new(
        db_pool,
        redis_conn,
        judge,
        monitor,
        locks,
        CONFIG.clone(),
    );

    // Background sweep keeps contest statuses in step with the clock and
    // reconciles pollers (including re-attaching them after a restart)
    tokio::spawn(sweep_service::run_status_sweep(state.clone()));

    // Build the router
    let app = Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(
        CONFIG.server.host.parse()?,
        CONFIG.server.port,
    );
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
