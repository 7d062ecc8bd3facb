use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::stage::StageTemplateRow;
use crate::scope::OwnerScope;

/// Returns the owner's full stage catalog in pipeline order.
pub async fn list_templates(
    pool: &PgPool,
    scope: OwnerScope,
) -> Result<Vec<StageTemplateRow>, AppError> {
    Ok(sqlx::query_as::<_, StageTemplateRow>(
        "SELECT * FROM stage_templates WHERE user_id = $1 ORDER BY sort_order ASC",
    )
    .bind(scope.user_id())
    .fetch_all(pool)
    .await?)
}

pub async fn get_template(
    pool: &PgPool,
    scope: OwnerScope,
    template_id: Uuid,
) -> Result<StageTemplateRow, AppError> {
    sqlx::query_as::<_, StageTemplateRow>(
        "SELECT * FROM stage_templates WHERE id = $1 AND user_id = $2",
    )
    .bind(template_id)
    .bind(scope.user_id())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Stage template {template_id} not found")))
}
