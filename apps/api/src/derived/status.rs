use serde::{Deserialize, Serialize};

use crate::models::application::ApplicationRow;
use crate::models::stage::StageEntryRow;

/// Aggregate status of an entity (job or company) derived from the
/// applications linked to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Idle,
    Active,
    Interviewing,
}

/// Recomputed on every read from the linked applications and their ledger
/// entries; `entries` must contain only entries of those applications.
///
/// - `interviewing` once any application has progressed past the first
///   stage (an entry with order > 1),
/// - else `active` while any application is still open,
/// - `idle` otherwise, including the zero-application case.
pub fn aggregate_status(apps: &[ApplicationRow], entries: &[StageEntryRow]) -> AggregateStatus {
    if apps.is_empty() {
        return AggregateStatus::Idle;
    }
    if entries.iter().any(|e| e.sort_order > 1) {
        return AggregateStatus::Interviewing;
    }
    if apps.iter().any(|a| a.status.is_open()) {
        return AggregateStatus::Active;
    }
    AggregateStatus::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use crate::models::stage::StageStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn app(status: ApplicationStatus) -> ApplicationRow {
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        ApplicationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            resume_id: None,
            name: "SRE".to_string(),
            status,
            applied_at: t,
            created_at: t,
            updated_at: t,
        }
    }

    fn entry(app_id: Uuid, order: i32) -> StageEntryRow {
        let t = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        StageEntryRow {
            id: Uuid::new_v4(),
            application_id: app_id,
            template_id: Uuid::new_v4(),
            status: StageStatus::Active,
            sort_order: order,
            started_at: t,
            completed_at: None,
            created_at: t,
        }
    }

    #[test]
    fn test_no_applications_is_idle() {
        assert_eq!(aggregate_status(&[], &[]), AggregateStatus::Idle);
    }

    #[test]
    fn test_past_first_stage_is_interviewing() {
        let a = app(ApplicationStatus::Rejected);
        let entries = vec![entry(a.id, 2)];
        // Entry order beats application status.
        assert_eq!(
            aggregate_status(&[a], &entries),
            AggregateStatus::Interviewing
        );
    }

    #[test]
    fn test_first_stage_only_is_active_while_open() {
        let a = app(ApplicationStatus::OnHold);
        let entries = vec![entry(a.id, 1)];
        assert_eq!(aggregate_status(&[a], &entries), AggregateStatus::Active);
    }

    #[test]
    fn test_all_closed_is_idle() {
        let apps = vec![app(ApplicationStatus::Rejected), app(ApplicationStatus::Archived)];
        assert_eq!(aggregate_status(&apps, &[]), AggregateStatus::Idle);
    }
}
