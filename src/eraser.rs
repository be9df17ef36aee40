use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::EraseError;

/// Irreversibly removes everything a user owns. All-or-nothing: partial
/// success is not a defined outcome.
#[async_trait]
pub trait UserDataEraser: Send + Sync {
    async fn erase(&self, user_id: Uuid) -> Result<(), EraseError>;
}

/// Deletes the `users` row; every user-owned table references it with
/// `ON DELETE CASCADE`, so one statement removes the account atomically.
#[derive(Clone)]
pub struct CascadingEraser {
    db: PgPool,
}

impl CascadingEraser {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDataEraser for CascadingEraser {
    async fn erase(&self, user_id: Uuid) -> Result<(), EraseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(EraseError::Permanent(anyhow::anyhow!(
                "user {user_id} does not exist"
            )));
        }

        info!(%user_id, "user data erased");
        Ok(())
    }
}

fn classify(e: sqlx::Error) -> EraseError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            EraseError::Transient(e.into())
        }
        _ => EraseError::Permanent(e.into()),
    }
}
