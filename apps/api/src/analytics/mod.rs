//! Analytics Aggregator — five read-only reports computed fresh per query
//! from a full scan of one user's store and ledger. No caching, no
//! incremental state; a report is always consistent with history at the
//! moment it is requested.

pub mod effectiveness;
pub mod funnel;
pub mod handlers;
pub mod overview;
pub mod queries;
pub mod stage_time;

use chrono::{DateTime, Utc};

/// All percentage and day figures in reports round to exactly 2 decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 86_400_000.0
}
