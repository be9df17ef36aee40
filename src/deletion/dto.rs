use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for scheduling account deletion. The password re-confirms
/// the caller's identity on top of the access token.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleDeletionResponse {
    pub request_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_deletion_at: OffsetDateTime,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedAccount {
    pub user_id: Uuid,
    pub deletion_request_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SweepError {
    pub user_id: Uuid,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: usize,
    pub error_count: usize,
    pub deleted_accounts: Vec<DeletedAccount>,
    pub errors: Vec<SweepError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn schedule_response_uses_rfc3339() {
        let response = ScheduleDeletionResponse {
            request_id: Uuid::new_v4(),
            scheduled_deletion_at: datetime!(2025-01-08 00:00:00 UTC),
            message: "scheduled".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("2025-01-08T00:00:00Z"));
        assert!(json.contains("request_id"));
    }

    #[test]
    fn cleanup_response_shape() {
        let user_id = Uuid::new_v4();
        let response = CleanupResponse {
            message: "Cleanup completed".into(),
            deleted_count: 1,
            error_count: 1,
            deleted_accounts: vec![DeletedAccount {
                user_id,
                deletion_request_id: Uuid::new_v4(),
            }],
            errors: vec![SweepError {
                user_id: Uuid::new_v4(),
                error: "cascade delete rejected".into(),
            }],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["deleted_count"], 1);
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["deleted_accounts"][0]["user_id"], user_id.to_string());
        assert_eq!(json["errors"][0]["error"], "cascade delete rejected");
    }
}
