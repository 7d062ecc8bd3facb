use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::analytics::effectiveness::{
    build_resume_effectiveness, build_source_effectiveness, ResumeEffectivenessRow,
    SourceEffectivenessRow,
};
use crate::analytics::funnel::{build_funnel, FunnelStage};
use crate::analytics::overview::{build_overview, OverviewReport};
use crate::analytics::queries;
use crate::analytics::stage_time::{build_stage_timing, StageTimingRow};
use crate::errors::AppError;
use crate::scope::OwnerScope;
use crate::stages::templates::list_templates;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/analytics/overview
pub async fn handle_overview(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<OverviewReport>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let apps = queries::fetch_applications(&state.db, scope).await?;
    let entries = queries::fetch_stage_entries(&state.db, scope).await?;
    Ok(Json(build_overview(&apps, &entries)))
}

/// GET /api/v1/analytics/funnel
pub async fn handle_funnel(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<FunnelStage>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let templates = list_templates(&state.db, scope).await?;
    let entries = queries::fetch_stage_entries(&state.db, scope).await?;
    Ok(Json(build_funnel(&templates, &entries)))
}

/// GET /api/v1/analytics/stage-time
pub async fn handle_stage_time(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<StageTimingRow>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let templates = list_templates(&state.db, scope).await?;
    let entries = queries::fetch_stage_entries(&state.db, scope).await?;
    Ok(Json(build_stage_timing(&templates, &entries, Utc::now())))
}

/// GET /api/v1/analytics/resumes
pub async fn handle_resume_effectiveness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeEffectivenessRow>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let resumes = queries::fetch_resumes(&state.db, scope).await?;
    let apps = queries::fetch_applications(&state.db, scope).await?;
    let entries = queries::fetch_stage_entries(&state.db, scope).await?;
    let templates = list_templates(&state.db, scope).await?;
    Ok(Json(build_resume_effectiveness(
        &resumes, &apps, &entries, &templates,
    )))
}

/// GET /api/v1/analytics/sources
pub async fn handle_source_effectiveness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<SourceEffectivenessRow>>, AppError> {
    let scope = OwnerScope::new(params.user_id);
    let jobs = queries::fetch_jobs(&state.db, scope).await?;
    let apps = queries::fetch_applications(&state.db, scope).await?;
    let entries = queries::fetch_stage_entries(&state.db, scope).await?;
    let templates = list_templates(&state.db, scope).await?;
    Ok(Json(build_source_effectiveness(
        &jobs, &apps, &entries, &templates,
    )))
}
