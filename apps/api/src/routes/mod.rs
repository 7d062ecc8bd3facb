pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::applications::handlers as applications;
use crate::stages::handlers as stages;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Application store
        .route(
            "/api/v1/applications",
            post(applications::handle_create_application)
                .get(applications::handle_list_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_set_status),
        )
        .route(
            "/api/v1/applications/:id/comments",
            post(applications::handle_add_comment),
        )
        // Stage history ledger
        .route(
            "/api/v1/applications/:id/stages",
            post(stages::handle_create_stage_entry).get(stages::handle_list_stage_entries),
        )
        .route(
            "/api/v1/stages/:id",
            patch(stages::handle_transition_stage_entry)
                .delete(stages::handle_delete_stage_entry),
        )
        // Derived state
        .route(
            "/api/v1/jobs/:id/status",
            get(applications::handle_job_status),
        )
        // Analytics
        .route("/api/v1/analytics/overview", get(analytics::handle_overview))
        .route("/api/v1/analytics/funnel", get(analytics::handle_funnel))
        .route(
            "/api/v1/analytics/stage-time",
            get(analytics::handle_stage_time),
        )
        .route(
            "/api/v1/analytics/resumes",
            get(analytics::handle_resume_effectiveness),
        )
        .route(
            "/api/v1/analytics/sources",
            get(analytics::handle_source_effectiveness),
        )
        .with_state(state)
}
