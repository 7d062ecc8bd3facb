//! Pluggable seam for derived entity status. The default implementation
//! rescans the ledger on every read; a materialized/cached variant can be
//! swapped in behind the trait without touching any caller.
//!
//! Carried in `AppState` as `Arc<dyn StatusCalculator>`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::store;
use crate::derived::status::{aggregate_status, AggregateStatus};
use crate::errors::AppError;
use crate::scope::OwnerScope;

#[async_trait]
pub trait StatusCalculator: Send + Sync {
    /// Aggregate status of one job, derived from its linked applications.
    async fn job_status(
        &self,
        scope: OwnerScope,
        job_id: Uuid,
    ) -> Result<AggregateStatus, AppError>;
}

/// Default calculator: full scan of the job's applications and their
/// ledger entries per query, always consistent with history.
pub struct LedgerScanCalculator {
    pool: PgPool,
}

impl LedgerScanCalculator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusCalculator for LedgerScanCalculator {
    async fn job_status(
        &self,
        scope: OwnerScope,
        job_id: Uuid,
    ) -> Result<AggregateStatus, AppError> {
        let job = store::get_job(&self.pool, scope, job_id).await?;
        let apps = store::list_applications_for_job(&self.pool, scope, job.id).await?;
        let entries = store::list_stage_entries_for_job(&self.pool, scope, job.id).await?;
        Ok(aggregate_status(&apps, &entries))
    }
}
