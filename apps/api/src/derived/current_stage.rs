use crate::models::stage::{StageEntryRow, StageStatus};

/// The stage an application is currently "in", derived from the ledger
/// instead of a stored pointer. Creating an entry and updating a pointer
/// would be two non-atomic writes, so the pointer is computed on read.
///
/// Rule: the entry greatest in `(sort_order, created_at)` order whose
/// status is not `cancelled`. Cancelled entries never represent progress.
/// `None` for an application with no history.
pub fn current_stage(entries: &[StageEntryRow]) -> Option<&StageEntryRow> {
    entries
        .iter()
        .filter(|e| e.status != StageStatus::Cancelled)
        .max_by_key(|e| (e.sort_order, e.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    fn entry(order: i32, created: DateTime<Utc>, status: StageStatus) -> StageEntryRow {
        StageEntryRow {
            id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            status,
            sort_order: order,
            started_at: created,
            completed_at: None,
            created_at: created,
        }
    }

    #[test]
    fn test_no_history_means_no_current_stage() {
        assert!(current_stage(&[]).is_none());
    }

    #[test]
    fn test_highest_order_wins() {
        let entries = vec![
            entry(1, at(1), StageStatus::Completed),
            entry(3, at(2), StageStatus::Active),
            entry(2, at(3), StageStatus::Completed),
        ];
        assert_eq!(current_stage(&entries).unwrap().sort_order, 3);
    }

    #[test]
    fn test_reentered_stage_breaks_tie_by_creation() {
        let older = entry(2, at(1), StageStatus::Completed);
        let newer = entry(2, at(5), StageStatus::Active);
        let newer_id = newer.id;
        let entries = vec![older, newer];
        assert_eq!(current_stage(&entries).unwrap().id, newer_id);
    }

    #[test]
    fn test_cancelled_entries_are_ignored() {
        let entries = vec![
            entry(1, at(1), StageStatus::Completed),
            entry(4, at(2), StageStatus::Cancelled),
        ];
        assert_eq!(current_stage(&entries).unwrap().sort_order, 1);
    }

    #[test]
    fn test_all_cancelled_means_none() {
        let entries = vec![entry(1, at(1), StageStatus::Cancelled)];
        assert!(current_stage(&entries).is_none());
    }
}
