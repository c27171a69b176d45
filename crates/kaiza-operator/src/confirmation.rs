// confirmation.rs — two-step confirmation for high-risk approvals (C14).
// Same shape as the kill-switch recovery two-step, with an added minimum
// wait before step 2 is accepted.

use chrono::{DateTime, Duration, Utc};
use kaiza_errors::KaizaError;

use crate::risk::RiskAcknowledgement;

const MINIMUM_WAIT_SECS: i64 = 30;
const CONFIRMATION_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    token: String,
    fingerprint: String,
    issued_at: DateTime<Utc>,
}

/// Step 1: issue a confirmation token for the given risk acknowledgement.
/// Step 2 cannot be accepted until `MINIMUM_WAIT_SECS` has elapsed, so an
/// operator cannot rubber-stamp a high-risk action in one motion.
pub fn initiate_confirmation(ack: &RiskAcknowledgement) -> PendingConfirmation {
    let issued_at = Utc::now();
    let token = kaiza_audit::hash_str(&format!("{}:{}", ack.consequences_fingerprint(), issued_at.timestamp_nanos_opt().unwrap_or_default()))[..12]
        .to_string();
    PendingConfirmation {
        token,
        fingerprint: ack.consequences_fingerprint(),
        issued_at,
    }
}

pub fn token(pending: &PendingConfirmation) -> &str {
    &pending.token
}

/// Step 2: the caller re-submits the token and the same consequences. Must
/// land at or after the minimum wait and within the confirmation window,
/// and the consequences must be byte-identical to step 1's.
pub fn confirm(
    pending: &PendingConfirmation,
    submitted_token: &str,
    resubmitted: &RiskAcknowledgement,
) -> Result<(), KaizaError> {
    let elapsed = Utc::now() - pending.issued_at;

    if elapsed < Duration::seconds(MINIMUM_WAIT_SECS) {
        return Err(KaizaError::ConfirmationWindowExpired);
    }
    if elapsed > Duration::seconds(CONFIRMATION_WINDOW_SECS) {
        return Err(KaizaError::ConfirmationWindowExpired);
    }
    if submitted_token != pending.token {
        return Err(KaizaError::ConfirmationMismatch);
    }
    if resubmitted.consequences_fingerprint() != pending.fingerprint {
        return Err(KaizaError::ConfirmationMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    fn ack() -> RiskAcknowledgement {
        RiskAcknowledgement {
            risk_level: RiskLevel::High,
            blast_radius: vec!["workspace:/tmp/demo".to_string()],
            reversible: false,
            consequences: vec!["overwrites 2 files".to_string()],
        }
    }

    #[test]
    fn confirming_immediately_is_rejected_for_not_meeting_minimum_wait() {
        let pending = initiate_confirmation(&ack());
        let tok = token(&pending).to_string();
        let err = confirm(&pending, &tok, &ack()).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIRMATION_WINDOW_EXPIRED");
    }

    #[test]
    fn confirming_after_minimum_wait_with_matching_consequences_succeeds() {
        let mut pending = initiate_confirmation(&ack());
        pending.issued_at = Utc::now() - Duration::seconds(MINIMUM_WAIT_SECS + 1);
        let tok = token(&pending).to_string();
        assert!(confirm(&pending, &tok, &ack()).is_ok());
    }

    #[test]
    fn mismatched_consequences_are_refused() {
        let mut pending = initiate_confirmation(&ack());
        pending.issued_at = Utc::now() - Duration::seconds(MINIMUM_WAIT_SECS + 1);
        let tok = token(&pending).to_string();
        let mut changed = ack();
        changed.consequences = vec!["overwrites 3 files".to_string()];
        let err = confirm(&pending, &tok, &changed).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIRMATION_MISMATCH");
    }

    #[test]
    fn stale_confirmation_past_the_window_is_rejected() {
        let mut pending = initiate_confirmation(&ack());
        pending.issued_at = Utc::now() - Duration::seconds(CONFIRMATION_WINDOW_SECS + 1);
        let tok = token(&pending).to_string();
        let err = confirm(&pending, &tok, &ack()).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIRMATION_WINDOW_EXPIRED");
    }
}
