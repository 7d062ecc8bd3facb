use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::stage::{StageEntryRow, StageStatus};
use crate::scope::OwnerScope;
use crate::stages::ledger;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateStageEntryRequest {
    pub user_id: Uuid,
    pub template_id: Uuid,
    /// Optional starting status (`pending` by default, `active` allowed).
    pub status: Option<StageStatus>,
}

/// POST /api/v1/applications/:id/stages
pub async fn handle_create_stage_entry(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<CreateStageEntryRequest>,
) -> Result<(StatusCode, Json<StageEntryRow>), AppError> {
    let scope = OwnerScope::new(req.user_id);
    let entry = ledger::append(
        &state.db,
        scope,
        application_id,
        req.template_id,
        req.status.unwrap_or(StageStatus::Pending),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/applications/:id/stages
pub async fn handle_list_stage_entries(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<StageEntryRow>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let entries = ledger::list_by_application(&state.db, scope, application_id).await?;
    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub user_id: Uuid,
    pub status: StageStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// PATCH /api/v1/stages/:id
pub async fn handle_transition_stage_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<StageEntryRow>, AppError> {
    let scope = OwnerScope::new(req.user_id);
    let entry = ledger::transition(&state.db, scope, entry_id, req.status, req.completed_at).await?;
    Ok(Json(entry))
}

/// DELETE /api/v1/stages/:id
pub async fn handle_delete_stage_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let scope = OwnerScope::new(params.user_id);
    ledger::remove(&state.db, scope, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
