//! Per-user fetch layer for the report builders. Each report is a full
//! scan of the owner's rows at request time; swapping a cached variant in
//! behind these functions would not change any caller.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::{JobRow, ResumeRow};
use crate::models::stage::StageEntryRow;
use crate::scope::OwnerScope;

pub async fn fetch_applications(
    pool: &PgPool,
    scope: OwnerScope,
) -> Result<Vec<ApplicationRow>, AppError> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE user_id = $1",
    )
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}

/// All ledger entries across the owner's applications.
pub async fn fetch_stage_entries(
    pool: &PgPool,
    scope: OwnerScope,
) -> Result<Vec<StageEntryRow>, AppError> {
    Ok(sqlx::query_as::<_, StageEntryRow>(
        r#"
        SELECT se.* FROM stage_entries se
        JOIN applications a ON a.id = se.application_id
        WHERE a.user_id = $1
        "#,
    )
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}

pub async fn fetch_resumes(pool: &PgPool, scope: OwnerScope) -> Result<Vec<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
            .bind(scope.user_id())
            .fetch_all(pool)
            .await?,
    )
}

pub async fn fetch_jobs(pool: &PgPool, scope: OwnerScope) -> Result<Vec<JobRow>, AppError> {
    Ok(
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE user_id = $1")
            .bind(scope.user_id())
            .fetch_all(pool)
            .await?,
    )
}
