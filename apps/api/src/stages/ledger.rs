//! Stage History Ledger — the append-only record of every stage an
//! application has occupied. Entries are only ever appended or have their
//! `status`/`completed_at` updated; `template_id` and `sort_order` are
//! frozen at creation so history survives catalog reorders.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::stage::{StageEntryRow, StageStatus};
use crate::scope::OwnerScope;

/// Validates the status a brand-new entry may start in. The caller decides
/// between `pending` and `active`; terminal statuses never start a stage.
pub fn validate_initial_status(status: StageStatus) -> Result<StageStatus, AppError> {
    if status.is_terminal() {
        return Err(AppError::Validation(format!(
            "A new stage entry cannot start in terminal status '{}'",
            status_label(status)
        )));
    }
    Ok(status)
}

/// Resolves the `completed_at` value to persist for a transition.
/// Terminal statuses are the only case it may be populated; `completed`
/// with no explicit timestamp defaults to `now`. Moving back to a
/// non-terminal status clears it.
pub fn resolve_completed_at(
    new_status: StageStatus,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    if new_status.is_terminal() {
        return Ok(match new_status {
            StageStatus::Completed => completed_at.or(Some(now)),
            _ => completed_at,
        });
    }
    if completed_at.is_some() {
        return Err(AppError::Validation(format!(
            "completed_at may only be set together with a terminal status, got '{}'",
            status_label(new_status)
        )));
    }
    Ok(None)
}

fn status_label(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "pending",
        StageStatus::Active => "active",
        StageStatus::Completed => "completed",
        StageStatus::Skipped => "skipped",
        StageStatus::Cancelled => "cancelled",
    }
}

/// Appends a new ledger entry for an application entering a stage.
/// `sort_order` is copied from the template at this moment. NOT idempotent:
/// every call creates a new history row, so retrying callers must
/// de-duplicate at the request layer.
pub async fn append(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
    template_id: Uuid,
    initial_status: StageStatus,
) -> Result<StageEntryRow, AppError> {
    let initial_status = validate_initial_status(initial_status)?;

    ensure_application_in_scope(pool, scope, application_id).await?;
    let template = crate::stages::templates::get_template(pool, scope, template_id).await?;

    let entry = sqlx::query_as::<_, StageEntryRow>(
        r#"
        INSERT INTO stage_entries (application_id, template_id, status, sort_order)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(application_id)
    .bind(template_id)
    .bind(initial_status)
    .bind(template.sort_order)
    .fetch_one(pool)
    .await?;

    info!(
        "Appended stage entry {} (template '{}', order {}) to application {}",
        entry.id, template.name, template.sort_order, application_id
    );
    Ok(entry)
}

/// Moves an existing entry to a new status. Repeating a terminal
/// transition with the same `completed_at` is a no-op on persisted state.
pub async fn transition(
    pool: &PgPool,
    scope: OwnerScope,
    entry_id: Uuid,
    new_status: StageStatus,
    completed_at: Option<DateTime<Utc>>,
) -> Result<StageEntryRow, AppError> {
    let completed_at = resolve_completed_at(new_status, completed_at, Utc::now())?;

    // Scope check rides on the join to the owning application.
    let existing = get_entry(pool, scope, entry_id).await?;

    let updated = sqlx::query_as::<_, StageEntryRow>(
        "UPDATE stage_entries SET status = $1, completed_at = $2 WHERE id = $3 RETURNING *",
    )
    .bind(new_status)
    .bind(completed_at)
    .bind(existing.id)
    .fetch_one(pool)
    .await?;

    info!(
        "Stage entry {} transitioned to '{}'",
        entry_id,
        status_label(new_status)
    );
    Ok(updated)
}

/// Permanently deletes one entry. A correction tool for mistaken appends,
/// not part of the normal lifecycle.
pub async fn remove(pool: &PgPool, scope: OwnerScope, entry_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM stage_entries
        USING applications
        WHERE applications.id = stage_entries.application_id
          AND stage_entries.id = $1
          AND applications.user_id = $2
        "#,
    )
    .bind(entry_id)
    .bind(scope.user_id())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Stage entry {entry_id} not found"
        )));
    }
    info!("Deleted stage entry {entry_id}");
    Ok(())
}

/// Full history for one application, ordered by `(sort_order, created_at)`.
/// Ties on `sort_order` are re-entered stages; the oldest entry comes first.
pub async fn list_by_application(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
) -> Result<Vec<StageEntryRow>, AppError> {
    ensure_application_in_scope(pool, scope, application_id).await?;

    Ok(sqlx::query_as::<_, StageEntryRow>(
        r#"
        SELECT * FROM stage_entries
        WHERE application_id = $1
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_entry(
    pool: &PgPool,
    scope: OwnerScope,
    entry_id: Uuid,
) -> Result<StageEntryRow, AppError> {
    sqlx::query_as::<_, StageEntryRow>(
        r#"
        SELECT se.* FROM stage_entries se
        JOIN applications a ON a.id = se.application_id
        WHERE se.id = $1 AND a.user_id = $2
        "#,
    )
    .bind(entry_id)
    .bind(scope.user_id())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Stage entry {entry_id} not found")))
}

async fn ensure_application_in_scope(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
) -> Result<(), AppError> {
    let exists: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM applications WHERE id = $1 AND user_id = $2")
            .bind(application_id)
            .bind(scope.user_id())
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Application {application_id} not found"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_new_entry_may_start_pending_or_active() {
        assert!(validate_initial_status(StageStatus::Pending).is_ok());
        assert!(validate_initial_status(StageStatus::Active).is_ok());
    }

    #[test]
    fn test_new_entry_rejects_terminal_start() {
        for status in [
            StageStatus::Completed,
            StageStatus::Skipped,
            StageStatus::Cancelled,
        ] {
            assert!(matches!(
                validate_initial_status(status),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_completed_defaults_to_now() {
        let got = resolve_completed_at(StageStatus::Completed, None, at(12)).unwrap();
        assert_eq!(got, Some(at(12)));
    }

    #[test]
    fn test_completed_keeps_explicit_timestamp() {
        let got = resolve_completed_at(StageStatus::Completed, Some(at(9)), at(12)).unwrap();
        assert_eq!(got, Some(at(9)));
    }

    #[test]
    fn test_skipped_does_not_default() {
        let got = resolve_completed_at(StageStatus::Skipped, None, at(12)).unwrap();
        assert_eq!(got, None);
        let got = resolve_completed_at(StageStatus::Cancelled, Some(at(9)), at(12)).unwrap();
        assert_eq!(got, Some(at(9)));
    }

    #[test]
    fn test_non_terminal_clears_completed_at() {
        let got = resolve_completed_at(StageStatus::Active, None, at(12)).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn test_non_terminal_with_timestamp_is_invalid() {
        assert!(matches!(
            resolve_completed_at(StageStatus::Pending, Some(at(9)), at(12)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_terminal_transition_is_deterministic() {
        // Re-running the same terminal transition yields the same value,
        // so a retried PATCH persists identical state.
        let first = resolve_completed_at(StageStatus::Completed, Some(at(9)), at(12)).unwrap();
        let second = resolve_completed_at(StageStatus::Completed, Some(at(9)), at(15)).unwrap();
        assert_eq!(first, second);
    }
}
