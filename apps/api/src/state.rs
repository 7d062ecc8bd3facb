use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::derived::calculator::StatusCalculator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Kept for handlers that need runtime settings beyond the pool.
    #[allow(dead_code)]
    pub config: Config,
    /// Pluggable derived-status calculator. Default: LedgerScanCalculator.
    pub status_calc: Arc<dyn StatusCalculator>,
}
