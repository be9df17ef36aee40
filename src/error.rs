use axum::http::StatusCode;
use thiserror::Error;

/// Failure taxonomy for the deletion workflow.
///
/// `Schedule` fails fast and atomically: any of these raised before the
/// ledger insert leaves no state change. `Sweep` only raises `Persistence`
/// (ledger read/claim failed) or `Unauthenticated` (bad trigger secret);
/// per-record erasure failures are recorded in the ledger instead.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("Invalid credentials")]
    Unauthenticated,
    #[error("Account deletion already pending")]
    AlreadyPending,
    #[error("Storage failure: {0}")]
    Persistence(anyhow::Error),
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl DeletionError {
    pub fn status(&self) -> StatusCode {
        match self {
            DeletionError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DeletionError::AlreadyPending => StatusCode::BAD_REQUEST,
            DeletionError::Persistence(_) | DeletionError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Outcome of a single erasure attempt. Never surfaces over HTTP; the sweep
/// writes it into the record's `error_message` for operator triage.
#[derive(Debug, Error)]
pub enum EraseError {
    #[error("transient erase failure: {0}")]
    Transient(anyhow::Error),
    #[error("permanent erase failure: {0}")]
    Permanent(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            DeletionError::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DeletionError::AlreadyPending.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DeletionError::Persistence(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
