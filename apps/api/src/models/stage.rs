use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One named, ordered step in a user's pipeline. The engine only reads
/// templates; create/rename/reorder live in the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StageTemplateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Status of a single ledger entry. `completed`, `skipped` and `cancelled`
/// are terminal; only terminal entries may carry a `completed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "stage_status", rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
    Skipped,
    Cancelled,
}

impl StageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StageStatus::Completed | StageStatus::Skipped | StageStatus::Cancelled
        )
    }
}

/// One append-only history record of an application occupying a stage.
/// `sort_order` is copied from the template at creation time and never
/// rewritten, so history survives later catalog reorders. Several entries
/// may reference the same template (re-entering a stage is allowed).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StageEntryRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub template_id: Uuid,
    pub status: StageStatus,
    pub sort_order: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
