//! Per-tenant submission throttle.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Gate configuration.
///
/// `min_interval` is what the gate enforces. `minutes_remaining` in a
/// throttled decision is computed against `reporting_window` instead: the
/// two were the same 20 minutes historically, but the enforced interval has
/// been retuned independently of the user-facing message, so they are kept
/// as separate knobs rather than derived from one another.
#[derive(Debug, Clone)]
pub struct ThrottlePolicy {
    pub min_interval: Duration,
    pub reporting_window: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::minutes(20),
            reporting_window: Duration::minutes(20),
        }
    }
}

/// Outcome of the gate. Throttling is an expected result, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleDecision {
    Allowed,
    Throttled { minutes_remaining: i64 },
}

impl ThrottlePolicy {
    /// Decide whether a tenant with the given `last_execution` may submit at
    /// `now`. Pure; no IO, no clock access.
    pub fn allow(&self, last_execution: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ThrottleDecision {
        match last_execution {
            None => ThrottleDecision::Allowed,
            Some(last) if now >= last + self.min_interval => ThrottleDecision::Allowed,
            Some(last) => {
                let remaining = (last + self.reporting_window) - now;
                ThrottleDecision::Throttled {
                    minutes_remaining: remaining.num_seconds().max(0) / 60,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ThrottlePolicy {
        ThrottlePolicy::default()
    }

    #[test]
    fn first_submission_is_always_allowed() {
        assert_eq!(policy().allow(None, Utc::now()), ThrottleDecision::Allowed);
    }

    #[test]
    fn one_minute_short_reports_one_minute_remaining() {
        let last = Utc::now();
        let decision = policy().allow(Some(last), last + Duration::minutes(19));
        assert_eq!(decision, ThrottleDecision::Throttled { minutes_remaining: 1 });
    }

    #[test]
    fn exactly_at_the_interval_is_allowed() {
        let last = Utc::now();
        let decision = policy().allow(Some(last), last + Duration::minutes(20));
        assert_eq!(decision, ThrottleDecision::Allowed);
    }

    #[test]
    fn reported_minutes_floor_toward_zero() {
        let last = Utc::now();
        // 30 seconds short of the window floors to 0 whole minutes.
        let decision = policy().allow(Some(last), last + Duration::minutes(19) + Duration::seconds(30));
        assert_eq!(decision, ThrottleDecision::Throttled { minutes_remaining: 0 });
    }

    #[test]
    fn reporting_window_is_independent_of_the_enforced_interval() {
        // A shortened enforcement interval still reports remaining time
        // against the historical 20-minute window.
        let policy = ThrottlePolicy {
            min_interval: Duration::minutes(5),
            reporting_window: Duration::minutes(20),
        };
        let last = Utc::now();
        let decision = policy.allow(Some(last), last + Duration::minutes(3));
        assert_eq!(decision, ThrottleDecision::Throttled { minutes_remaining: 17 });
        assert_eq!(policy.allow(Some(last), last + Duration::minutes(5)), ThrottleDecision::Allowed);
    }
}
