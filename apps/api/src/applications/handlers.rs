use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::store::{self, NewApplication};
use crate::derived::activity::last_activity;
use crate::derived::current_stage::current_stage;
use crate::derived::status::AggregateStatus;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, CommentRow};
use crate::models::stage::StageEntryRow;
use crate::scope::OwnerScope;
use crate::stages::ledger;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateApplicationRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub name: String,
    pub applied_at: Option<DateTime<Utc>>,
}

/// POST /api/v1/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let scope = OwnerScope::new(req.user_id);
    let row = store::create_application(
        &state.db,
        scope,
        NewApplication {
            job_id: req.job_id,
            resume_id: req.resume_id,
            name: req.name,
            applied_at: req.applied_at,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    Ok(Json(store::list_applications(&state.db, scope).await?))
}

#[derive(Serialize)]
pub struct ApplicationDetail {
    pub application: ApplicationRow,
    /// Derived from the ledger on every read; never stored.
    pub current_stage: Option<StageEntryRow>,
    pub last_activity: DateTime<Utc>,
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ApplicationDetail>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let application = store::get_application(&state.db, scope, application_id).await?;
    let entries = ledger::list_by_application(&state.db, scope, application_id).await?;
    let comments = store::list_comments(&state.db, scope, application_id).await?;

    Ok(Json(ApplicationDetail {
        current_stage: current_stage(&entries).cloned(),
        last_activity: last_activity(&application, &entries, &comments),
        application,
    }))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub user_id: Uuid,
    pub status: ApplicationStatus,
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let scope = OwnerScope::new(req.user_id);
    let row = store::set_status(&state.db, scope, application_id, req.status).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let scope = OwnerScope::new(params.user_id);
    store::delete_application(&state.db, scope, application_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub user_id: Uuid,
    pub stage_entry_id: Option<Uuid>,
    pub content: String,
}

/// POST /api/v1/applications/:id/comments
pub async fn handle_add_comment(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentRow>), AppError> {
    let scope = OwnerScope::new(req.user_id);
    let comment = store::add_comment(
        &state.db,
        scope,
        application_id,
        req.stage_entry_id,
        &req.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: AggregateStatus,
}

/// GET /api/v1/jobs/:id/status
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let status = state.status_calc.job_status(scope, job_id).await?;

    Ok(Json(JobStatusResponse { job_id, status }))
}
