//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use presence_auth::JwtDecoder;
use presence_cache::CacheManager;
use presence_core::config::AppConfig;
use presence_database::DatabasePool;
use presence_realtime::MarkerBus;
use presence_service::PresenceService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, checked by the readiness probe. `None` when the
    /// presence stores are not database-backed.
    pub db: Option<DatabasePool>,
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Presence ─────────────────────────────────────────────
    /// Presence engine
    pub presence: Arc<PresenceService>,
    /// Local fan-out of presence change markers
    pub markers: MarkerBus,
}
