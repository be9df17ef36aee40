use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::deletion::repo::DeletionLedger;
use crate::deletion::repo_types::{DeletionRequest, DeletionStatus};
use crate::eraser::UserDataEraser;
use crate::error::DeletionError;
use crate::identity::IdentityVerifier;

/// Grace window between a deletion request and eligibility for erasure.
pub const GRACE_PERIOD: Duration = Duration::days(7);

/// One erasure that could not be completed during a sweep.
#[derive(Debug)]
pub struct FailedErase {
    pub user_id: Uuid,
    pub request_id: Uuid,
    pub error: String,
}

/// Aggregate outcome of one sweep, detailed enough that an operator can
/// triage without re-querying the ledger.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub completed: Vec<DeletionRequest>,
    pub failed: Vec<FailedErase>,
}

/// Validates a user-initiated deletion request and writes the pending ledger
/// entry. No erasure happens synchronously; the reaper picks the record up
/// once `now + GRACE_PERIOD` has elapsed.
pub async fn schedule_deletion(
    verifier: &dyn IdentityVerifier,
    ledger: &dyn DeletionLedger,
    user_id: Uuid,
    password: &str,
    now: OffsetDateTime,
) -> Result<DeletionRequest, DeletionError> {
    let verified = verifier
        .verify(user_id, password)
        .await
        .map_err(DeletionError::Internal)?;
    if !verified {
        return Err(DeletionError::Unauthenticated);
    }

    // The check matches `processing` too, so a request whose erasure is
    // mid-flight in a concurrent sweep still blocks a new one.
    let existing = ledger
        .find_active(user_id)
        .await
        .map_err(DeletionError::Persistence)?;
    if existing.is_some() {
        return Err(DeletionError::AlreadyPending);
    }

    let request = ledger
        .insert_pending(user_id, now + GRACE_PERIOD)
        .await
        .map_err(DeletionError::Persistence)?;

    // Advisory profile tombstone; a failure here must not undo the request.
    if let Err(e) = ledger.mark_deletion_requested(user_id, now).await {
        warn!(error = %e, %user_id, "failed to set deletion marker on profile");
    }

    info!(
        %user_id,
        request_id = %request.id,
        scheduled_deletion_at = %request.scheduled_deletion_at,
        "account deletion scheduled"
    );
    Ok(request)
}

/// Claims every overdue pending record and drives each through erasure,
/// recording a terminal outcome per record. One record's failure never
/// aborts the batch.
pub async fn sweep(
    ledger: &dyn DeletionLedger,
    eraser: &dyn UserDataEraser,
    now: OffsetDateTime,
) -> Result<SweepOutcome, DeletionError> {
    let claimed = ledger
        .claim_due(now)
        .await
        .map_err(DeletionError::Persistence)?;

    if claimed.is_empty() {
        debug!("no deletion requests due");
        return Ok(SweepOutcome::default());
    }

    info!(count = claimed.len(), "processing due deletion requests");

    let mut outcome = SweepOutcome::default();
    for mut request in claimed {
        match eraser.erase(request.user_id).await {
            Ok(()) => match ledger.complete(request.id, now).await {
                Ok(()) => {
                    info!(user_id = %request.user_id, request_id = %request.id, "account deleted");
                    request.status = DeletionStatus::Completed;
                    request.deleted_at = Some(now);
                    outcome.completed.push(request);
                }
                Err(e) => {
                    // Data is gone but the ledger write failed. The record
                    // stays `processing` and is never re-erased; surface it
                    // for operator remediation.
                    error!(error = %e, user_id = %request.user_id, "erased but ledger update failed");
                    outcome.failed.push(FailedErase {
                        user_id: request.user_id,
                        request_id: request.id,
                        error: format!("erased but ledger update failed: {e}"),
                    });
                }
            },
            Err(e) => {
                error!(error = %e, user_id = %request.user_id, "account erasure failed");
                let message = e.to_string();
                if let Err(we) = ledger.fail(request.id, &message).await {
                    error!(error = %we, user_id = %request.user_id, "failed to record erasure failure");
                }
                outcome.failed.push(FailedErase {
                    user_id: request.user_id,
                    request_id: request.id,
                    error: message,
                });
            }
        }
    }

    Ok(outcome)
}
