use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of an application. `active`/`on_hold` count as open,
/// `rejected`/`offer`/`archived` as closed in analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Active,
    OnHold,
    Rejected,
    Offer,
    Archived,
}

impl ApplicationStatus {
    pub fn is_open(self) -> bool {
        matches!(self, ApplicationStatus::Active | ApplicationStatus::OnHold)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub name: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub stage_entry_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
