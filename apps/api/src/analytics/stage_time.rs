use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analytics::{days_between, round2};
use crate::models::stage::{StageEntryRow, StageTemplateRow};

#[derive(Debug, Serialize)]
pub struct StageTimingRow {
    pub template_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    /// Distinct applications contributing at least one entry.
    pub applications: usize,
    pub avg_days: f64,
    pub min_days: f64,
    pub max_days: f64,
}

/// Dwell time per stage, in catalog order. A finished entry contributes
/// `completed_at - started_at`; an entry still open contributes its
/// elapsed time `now - started_at`, so averages mix both on purpose.
pub fn build_stage_timing(
    templates: &[StageTemplateRow],
    entries: &[StageEntryRow],
    now: DateTime<Utc>,
) -> Vec<StageTimingRow> {
    templates
        .iter()
        .map(|template| {
            let mut durations = Vec::new();
            let mut applications = HashSet::new();
            for entry in entries.iter().filter(|e| e.template_id == template.id) {
                let end = entry.completed_at.unwrap_or(now);
                durations.push(days_between(entry.started_at, end));
                applications.insert(entry.application_id);
            }

            let (avg, min, max) = if durations.is_empty() {
                (0.0, 0.0, 0.0)
            } else {
                let sum: f64 = durations.iter().sum();
                let min = durations.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                (sum / durations.len() as f64, min, max)
            };

            StageTimingRow {
                template_id: template.id,
                name: template.name.clone(),
                sort_order: template.sort_order,
                applications: applications.len(),
                avg_days: round2(avg),
                min_days: round2(min),
                max_days: round2(max),
            }
        })
        .collect()
}
