use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use crate::{auth::extractors::AuthUser, error::DeletionError, state::AppState};

use super::dto::{
    CleanupResponse, DeleteAccountRequest, DeletedAccount, ScheduleDeletionResponse, SweepError,
};
use super::services;

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/account/delete", post(delete_account))
}

pub fn internal_routes() -> Router<AppState> {
    Router::new().route(
        "/internal/cleanup-deleted-accounts",
        post(cleanup_deleted_accounts),
    )
}

/// POST /account/delete — schedules irrevocable erasure after the grace
/// period. Requires a valid access token plus the account password.
#[instrument(skip(state, payload))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<Json<ScheduleDeletionResponse>, (StatusCode, String)> {
    if payload.password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Password is required".into()));
    }

    let request = services::schedule_deletion(
        state.verifier.as_ref(),
        state.ledger.as_ref(),
        user_id,
        &payload.password,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(|e| {
        match &e {
            DeletionError::Unauthenticated => {
                warn!(%user_id, "deletion request with invalid password")
            }
            DeletionError::AlreadyPending => warn!(%user_id, "deletion already pending"),
            _ => error!(error = %e, %user_id, "schedule deletion failed"),
        }
        (e.status(), e.to_string())
    })?;

    Ok(Json(ScheduleDeletionResponse {
        request_id: request.id,
        scheduled_deletion_at: request.scheduled_deletion_at,
        message: "Account deletion scheduled for 7 days from now.".into(),
    }))
}

/// POST /internal/cleanup-deleted-accounts — cron-triggered sweep over all
/// overdue pending requests. Authenticated by a shared secret, never a user
/// credential.
#[instrument(skip(state, headers))]
pub async fn cleanup_deleted_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>, (StatusCode, String)> {
    let authorized = bearer_token(&headers)
        .map(|token| !state.config.cron_secret.is_empty() && token == state.config.cron_secret)
        .unwrap_or(false);
    if !authorized {
        warn!("cleanup trigger with missing or invalid secret");
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized".into()));
    }

    let outcome = services::sweep(
        state.ledger.as_ref(),
        state.eraser.as_ref(),
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "sweep failed");
        (e.status(), e.to_string())
    })?;

    let message = if outcome.completed.is_empty() && outcome.failed.is_empty() {
        "No accounts to delete".to_string()
    } else {
        "Cleanup completed".to_string()
    };

    Ok(Json(CleanupResponse {
        message,
        deleted_count: outcome.completed.len(),
        error_count: outcome.failed.len(),
        deleted_accounts: outcome
            .completed
            .iter()
            .map(|r| DeletedAccount {
                user_id: r.user_id,
                deletion_request_id: r.id,
            })
            .collect(),
        errors: outcome
            .failed
            .iter()
            .map(|f| SweepError {
                user_id: f.user_id,
                error: f.error.clone(),
            })
            .collect(),
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn bearer_token_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer cron-secret".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("cron-secret"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
