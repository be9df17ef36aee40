use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a deletion request. Transitions are monotonic:
/// `pending → processing → (completed | failed)`. Terminal states are
/// immutable; a sweep never reselects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "deletion_status", rename_all = "lowercase")]
pub enum DeletionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One row in `account_deletion_requests` — the unit of work and, once
/// terminal, the audit trail of the erasure it describes. Rows are never
/// deleted, even after the user's other data is gone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeletionRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: DeletionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_deletion_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    pub error_message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeletionStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&DeletionStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
