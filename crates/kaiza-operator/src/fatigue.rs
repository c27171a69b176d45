// fatigue.rs — approval fatigue guards (C14): caps per session
// and per rolling hour, plus a mandatory pause after a run of approvals.

use chrono::{DateTime, Duration, Utc};
use kaiza_errors::KaizaError;

const MAX_PER_SESSION: usize = 10;
const MAX_PER_HOUR: usize = 20;
const PAUSE_AFTER_CONSECUTIVE: usize = 5;
const MANDATORY_PAUSE_SECS: i64 = 60;

#[derive(Debug, Default)]
pub struct FatigueTracker {
    session_approvals: Vec<DateTime<Utc>>,
    consecutive_since_pause: usize,
}

impl FatigueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call before recording an approval that happens `now`. Refuses if any
    /// guard would be exceeded; callers must not record the approval on an
    /// `Err` result.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), KaizaError> {
        if self.session_approvals.len() >= MAX_PER_SESSION {
            return Err(KaizaError::ApprovalFatigueLimit(format!(
                "session limit of {MAX_PER_SESSION} approvals reached"
            )));
        }

        let hour_ago = now - Duration::hours(1);
        let in_last_hour = self.session_approvals.iter().filter(|t| **t > hour_ago).count();
        if in_last_hour >= MAX_PER_HOUR {
            return Err(KaizaError::ApprovalFatigueLimit(format!(
                "hourly limit of {MAX_PER_HOUR} approvals reached"
            )));
        }

        if self.consecutive_since_pause >= PAUSE_AFTER_CONSECUTIVE {
            if let Some(last) = self.session_approvals.last() {
                if now - *last < Duration::seconds(MANDATORY_PAUSE_SECS) {
                    return Err(KaizaError::ApprovalFatigueLimit(format!(
                        "a {MANDATORY_PAUSE_SECS}s pause is required after {PAUSE_AFTER_CONSECUTIVE} consecutive approvals"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Record an approval that passed `check`. Resets the consecutive
    /// counter once the mandatory pause has actually elapsed.
    pub fn record(&mut self, now: DateTime<Utc>) {
        if self.consecutive_since_pause >= PAUSE_AFTER_CONSECUTIVE {
            self.consecutive_since_pause = 0;
        }
        self.consecutive_since_pause += 1;
        self.session_approvals.push(now);
    }
}
