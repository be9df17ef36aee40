use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::DeletionRequest;

/// Persisted ledger of deletion requests — the sole source of truth for the
/// state machine. All coordination between the scheduler and the reaper is
/// expressed as conditional writes against it.
#[async_trait]
pub trait DeletionLedger: Send + Sync {
    /// Any record for `user_id` that is still in flight
    /// (`pending` or `processing`).
    async fn find_active(&self, user_id: Uuid) -> anyhow::Result<Option<DeletionRequest>>;

    /// Insert a new `pending` record with the given deadline.
    async fn insert_pending(
        &self,
        user_id: Uuid,
        scheduled_deletion_at: OffsetDateTime,
    ) -> anyhow::Result<DeletionRequest>;

    /// Advisory tombstone on the user profile. Not authoritative; callers
    /// must tolerate failure.
    async fn mark_deletion_requested(
        &self,
        user_id: Uuid,
        requested_at: OffsetDateTime,
    ) -> anyhow::Result<()>;

    /// Atomically claim every overdue `pending` record by moving it to
    /// `processing`, returning the claimed rows. Overlapping sweeps partition
    /// the due set between them; a record is claimed by at most one caller.
    async fn claim_due(&self, now: OffsetDateTime) -> anyhow::Result<Vec<DeletionRequest>>;

    /// `processing → completed`, stamping `deleted_at`.
    async fn complete(&self, id: Uuid, deleted_at: OffsetDateTime) -> anyhow::Result<()>;

    /// `processing → failed`, recording the cause for manual remediation.
    async fn fail(&self, id: Uuid, error_message: &str) -> anyhow::Result<()>;
}

const REQUEST_COLUMNS: &str =
    "id, user_id, status, scheduled_deletion_at, deleted_at, error_message, created_at";

#[derive(Clone)]
pub struct PgDeletionLedger {
    db: PgPool,
}

impl PgDeletionLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeletionLedger for PgDeletionLedger {
    async fn find_active(&self, user_id: Uuid) -> anyhow::Result<Option<DeletionRequest>> {
        let row = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM account_deletion_requests
            WHERE user_id = $1 AND status IN ('pending', 'processing')
            LIMIT 1
            "#,
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert_pending(
        &self,
        user_id: Uuid,
        scheduled_deletion_at: OffsetDateTime,
    ) -> anyhow::Result<DeletionRequest> {
        let row = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            INSERT INTO account_deletion_requests (user_id, status, scheduled_deletion_at)
            VALUES ($1, 'pending', $2)
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(scheduled_deletion_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn mark_deletion_requested(
        &self,
        user_id: Uuid,
        requested_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET deletion_requested_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(requested_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn claim_due(&self, now: OffsetDateTime) -> anyhow::Result<Vec<DeletionRequest>> {
        // Single conditional UPDATE: rows already claimed by a concurrent
        // sweep no longer match `status = 'pending'` and are skipped.
        let rows = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            UPDATE account_deletion_requests
            SET status = 'processing'
            WHERE status = 'pending' AND scheduled_deletion_at <= $1
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(now)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn complete(&self, id: Uuid, deleted_at: OffsetDateTime) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE account_deletion_requests
            SET status = 'completed', deleted_at = $2
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("deletion request {id} was not in 'processing'");
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, error_message: &str) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE account_deletion_requests
            SET status = 'failed', error_message = $2
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("deletion request {id} was not in 'processing'");
        }
        Ok(())
    }
}
