use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::analytics::{days_between, round2};
use crate::models::application::ApplicationRow;
use crate::models::stage::StageEntryRow;

#[derive(Debug, Serialize)]
pub struct OverviewReport {
    pub total_applications: usize,
    pub active_applications: usize,
    pub closed_applications: usize,
    pub response_rate: f64,
    pub avg_days_to_first_response: f64,
}

/// A "response" is any ledger entry past the first stage (order > 1).
/// Applications that never got one are excluded from the first-response
/// average rather than counted as zero.
pub fn build_overview(apps: &[ApplicationRow], entries: &[StageEntryRow]) -> OverviewReport {
    let total = apps.len();
    let active = apps.iter().filter(|a| a.status.is_open()).count();
    let closed = total - active;

    // Earliest past-first-stage entry per application.
    let mut first_response: HashMap<Uuid, chrono::DateTime<chrono::Utc>> = HashMap::new();
    for entry in entries.iter().filter(|e| e.sort_order > 1) {
        first_response
            .entry(entry.application_id)
            .and_modify(|t| {
                if entry.started_at < *t {
                    *t = entry.started_at;
                }
            })
            .or_insert(entry.started_at);
    }

    let mut responders = 0usize;
    let mut day_sum = 0.0;
    for app in apps {
        if let Some(first) = first_response.get(&app.id) {
            responders += 1;
            day_sum += days_between(app.applied_at, *first);
        }
    }

    let response_rate = if total == 0 {
        0.0
    } else {
        round2(responders as f64 / total as f64 * 100.0)
    };
    let avg_days_to_first_response = if responders == 0 {
        0.0
    } else {
        round2(day_sum / responders as f64)
    };

    OverviewReport {
        total_applications: total,
        active_applications: active,
        closed_applications: closed,
        response_rate,
        avg_days_to_first_response,
    }
}
