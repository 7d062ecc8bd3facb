//! Application Store — the aggregate a user's job search hangs off.
//! Writes are single-statement; derived facts (current stage, last
//! activity) are never stored here, only computed on read.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, CommentRow};
use crate::models::job::JobRow;
use crate::models::stage::StageEntryRow;
use crate::scope::OwnerScope;

pub async fn get_application(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
) -> Result<ApplicationRow, AppError> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE id = $1 AND user_id = $2",
    )
    .bind(application_id)
    .bind(scope.user_id())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
}

pub async fn list_applications(
    pool: &PgPool,
    scope: OwnerScope,
) -> Result<Vec<ApplicationRow>, AppError> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}

pub struct NewApplication {
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub name: String,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Creates an application against an existing job (and optionally a resume
/// snapshot). Starts `active`; `applied_at` defaults to now.
pub async fn create_application(
    pool: &PgPool,
    scope: OwnerScope,
    new: NewApplication,
) -> Result<ApplicationRow, AppError> {
    if new.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Application name must not be empty".to_string(),
        ));
    }
    get_job(pool, scope, new.job_id).await?;
    if let Some(resume_id) = new.resume_id {
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(resume_id)
                .bind(scope.user_id())
                .fetch_optional(pool)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
        }
    }

    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (user_id, job_id, resume_id, name, applied_at)
        VALUES ($1, $2, $3, $4, COALESCE($5, now()))
        RETURNING *
        "#,
    )
    .bind(scope.user_id())
    .bind(new.job_id)
    .bind(new.resume_id)
    .bind(new.name.trim())
    .bind(new.applied_at)
    .fetch_one(pool)
    .await?;

    info!("Created application {} for job {}", row.id, new.job_id);
    Ok(row)
}

pub async fn set_status(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    let updated = sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications SET status = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(application_id)
    .bind(scope.user_id())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    info!("Application {application_id} status changed");
    Ok(updated)
}

/// Hard delete; the ledger and comments cascade at the schema level.
pub async fn delete_application(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
        .bind(application_id)
        .bind(scope.user_id())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Application {application_id} not found"
        )));
    }
    info!("Deleted application {application_id} and its history");
    Ok(())
}

pub async fn list_comments(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
) -> Result<Vec<CommentRow>, AppError> {
    get_application(pool, scope, application_id).await?;
    Ok(sqlx::query_as::<_, CommentRow>(
        "SELECT * FROM comments WHERE application_id = $1 ORDER BY created_at ASC",
    )
    .bind(application_id)
    .fetch_all(pool)
    .await?)
}

pub async fn add_comment(
    pool: &PgPool,
    scope: OwnerScope,
    application_id: Uuid,
    stage_entry_id: Option<Uuid>,
    content: &str,
) -> Result<CommentRow, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "Comment content must not be empty".to_string(),
        ));
    }
    get_application(pool, scope, application_id).await?;
    if let Some(entry_id) = stage_entry_id {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM stage_entries WHERE id = $1 AND application_id = $2",
        )
        .bind(entry_id)
        .bind(application_id)
        .fetch_optional(pool)
        .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!(
                "Stage entry {entry_id} not found on this application"
            )));
        }
    }

    Ok(sqlx::query_as::<_, CommentRow>(
        r#"
        INSERT INTO comments (application_id, stage_entry_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(application_id)
    .bind(stage_entry_id)
    .bind(content.trim())
    .fetch_one(pool)
    .await?)
}

pub async fn get_job(pool: &PgPool, scope: OwnerScope, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(scope.user_id())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

pub async fn list_applications_for_job(
    pool: &PgPool,
    scope: OwnerScope,
    job_id: Uuid,
) -> Result<Vec<ApplicationRow>, AppError> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE job_id = $1 AND user_id = $2",
    )
    .bind(job_id)
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}

/// Ledger entries across every application attached to one job.
pub async fn list_stage_entries_for_job(
    pool: &PgPool,
    scope: OwnerScope,
    job_id: Uuid,
) -> Result<Vec<StageEntryRow>, AppError> {
    Ok(sqlx::query_as::<_, StageEntryRow>(
        r#"
        SELECT se.* FROM stage_entries se
        JOIN applications a ON a.id = se.application_id
        WHERE a.job_id = $1 AND a.user_id = $2
        "#,
    )
    .bind(job_id)
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}
