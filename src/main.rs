//! Presence Server: user presence tracking for multi-tab web clients
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use presence_core::config::AppConfig;
use presence_core::error::AppError;
use presence_database::DatabasePool;
use presence_database::repositories::{
    GroupMembershipRepository, PresenceAggregateRepository, PresenceSessionRepository,
    ProfileSettingsRepository,
};
use presence_realtime::bridge::RedisMarkerRelay;
use presence_realtime::{CacheEventMarker, MarkerBus};
use presence_service::{PresenceService, PresenceStores};

#[tokio::main]
async fn main() {
    let env = std::env::var("PRESENCE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting presence server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    presence_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = Arc::new(presence_cache::CacheManager::new(&config.cache).await?);
    tracing::info!("Cache initialized");

    // ── Step 3: Initialize auth ──────────────────────────────────
    let jwt_decoder = Arc::new(presence_auth::JwtDecoder::new(
        &config.auth,
        Arc::clone(&cache),
    ));

    // ── Step 4: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 5: Change markers ───────────────────────────────────
    let markers = MarkerBus::new(config.realtime.channel_buffer_size);
    let mut event_marker = CacheEventMarker::new(Arc::clone(&cache), markers.clone());

    let relay_handle = match (config.realtime.redis_pubsub, cache.redis_client()) {
        (true, Some(client)) => {
            let relay = RedisMarkerRelay::new(client.clone(), &config.realtime.marker_channel);
            event_marker = event_marker.with_relay(relay.clone());

            let bus = markers.clone();
            let relay_shutdown = shutdown_rx.clone();
            tracing::info!(
                channel = %config.realtime.marker_channel,
                "Starting presence marker relay..."
            );
            Some(tokio::spawn(async move {
                if let Err(e) = relay.run(bus, relay_shutdown).await {
                    tracing::error!("Presence marker relay error: {}", e);
                }
            }))
        }
        (true, None) => {
            tracing::warn!("realtime.redis_pubsub requires the redis cache provider; relay disabled");
            None
        }
        (false, _) => None,
    };

    // ── Step 6: Presence engine ──────────────────────────────────
    let pool = db.pool().clone();
    let stores = PresenceStores {
        sessions: Arc::new(PresenceSessionRepository::new(pool.clone())),
        aggregates: Arc::new(PresenceAggregateRepository::new(pool.clone())),
        profiles: Arc::new(ProfileSettingsRepository::new(pool.clone())),
        memberships: Arc::new(GroupMembershipRepository::new(pool)),
        marker: Arc::new(event_marker),
    };
    let presence = Arc::new(PresenceService::new(&config.presence, stores));
    tracing::info!(
        online_window_seconds = config.presence.online_window_seconds,
        idle_window_seconds = ?config.presence.idle_window_seconds,
        retention_days = config.presence.retention_days,
        "Presence engine initialized"
    );

    // ── Step 7: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let app_state = presence_api::AppState {
        config: Arc::new(config),
        db: Some(db.clone()),
        cache: Arc::clone(&cache),
        jwt_decoder,
        presence,
        markers,
    };

    let app = presence_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Presence server listening on {}", addr);

    // ── Step 8: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 9: Wait for background tasks ────────────────────────
    if let Some(handle) = relay_handle {
        tracing::info!("Waiting for marker relay to stop...");
        let _ = tokio::time::timeout(grace, handle).await;
    }
    db.close().await;

    tracing::info!("Presence server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
