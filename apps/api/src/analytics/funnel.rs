use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::analytics::round2;
use crate::models::stage::{StageEntryRow, StageTemplateRow};

#[derive(Debug, Serialize)]
pub struct FunnelStage {
    pub template_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    /// Distinct applications with at least one entry referencing this template.
    pub count: usize,
    pub conversion_rate: f64,
    pub drop_off_rate: f64,
}

/// One row per catalog template, in pipeline order. The first stage
/// converts at 100.0 by definition; a zero-count previous stage also
/// reports 100.0 (the historical degenerate rule, kept as-is).
pub fn build_funnel(
    templates: &[StageTemplateRow],
    entries: &[StageEntryRow],
) -> Vec<FunnelStage> {
    let mut stages = Vec::with_capacity(templates.len());
    let mut previous_count: Option<usize> = None;

    for template in templates {
        let count = entries
            .iter()
            .filter(|e| e.template_id == template.id)
            .map(|e| e.application_id)
            .collect::<HashSet<_>>()
            .len();

        let conversion_rate = match previous_count {
            None => 100.0,
            Some(0) => 100.0,
            Some(prev) => round2(count as f64 / prev as f64 * 100.0),
        };
        let drop_off_rate = match previous_count {
            None | Some(0) => 0.0,
            Some(prev) => round2((prev as f64 - count as f64) / prev as f64 * 100.0),
        };

        stages.push(FunnelStage {
            template_id: template.id,
            name: template.name.clone(),
            sort_order: template.sort_order,
            count,
            conversion_rate,
            drop_off_rate,
        });
        previous_count = Some(count);
    }

    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stage::StageStatus;
    use chrono::{TimeZone, Utc};

    fn template(name: &str, order: i32) -> StageTemplateRow {
        StageTemplateRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            sort_order: order,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn entry(app_id: Uuid, template: &StageTemplateRow) -> StageEntryRow {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        StageEntryRow {
            id: Uuid::new_v4(),
            application_id: app_id,
            template_id: template.id,
            status: StageStatus::Active,
            sort_order: template.sort_order,
            started_at: t,
            completed_at: None,
            created_at: t,
        }
    }

    #[test]
    fn test_three_apps_two_reach_phone_screen() {
        let applied = template("Applied", 1);
        let phone = template("Phone Screen", 2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let entries = vec![
            entry(a, &applied),
            entry(b, &applied),
            entry(c, &applied),
            entry(a, &phone),
            entry(b, &phone),
        ];
        let funnel = build_funnel(&[applied, phone], &entries);

        assert_eq!(funnel[0].count, 3);
        assert_eq!(funnel[0].conversion_rate, 100.0);
        assert_eq!(funnel[0].drop_off_rate, 0.0);
        assert_eq!(funnel[1].count, 2);
        assert_eq!(funnel[1].conversion_rate, 66.67);
        assert_eq!(funnel[1].drop_off_rate, 33.33);
    }

    #[test]
    fn test_reentered_stage_counts_application_once() {
        let interview = template("Interview", 3);
        let a = Uuid::new_v4();
        let entries = vec![entry(a, &interview), entry(a, &interview)];
        let funnel = build_funnel(&[interview], &entries);
        assert_eq!(funnel[0].count, 1);
    }

    #[test]
    fn test_zero_previous_count_converts_at_hundred() {
        let applied = template("Applied", 1);
        let phone = template("Phone Screen", 2);
        let onsite = template("Onsite", 3);
        let a = Uuid::new_v4();
        // Nobody reached Phone Screen, one application jumped to Onsite.
        let entries = vec![entry(a, &applied), entry(a, &onsite)];
        let funnel = build_funnel(&[applied, phone, onsite], &entries);

        assert_eq!(funnel[1].count, 0);
        assert_eq!(funnel[1].conversion_rate, 0.0);
        assert_eq!(funnel[2].conversion_rate, 100.0);
        assert_eq!(funnel[2].drop_off_rate, 0.0);
    }

    #[test]
    fn test_empty_catalog_yields_empty_funnel() {
        assert!(build_funnel(&[], &[]).is_empty());
    }
}
