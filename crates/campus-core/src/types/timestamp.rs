//! Timestamp helpers shared by every repository backend.
//!
//! PostgreSQL stores `timestamptz` with microsecond precision. All
//! timestamps are truncated to microseconds before they are written so that
//! the compare-and-swap on `updated_at` sees identical values in both the
//! PostgreSQL and the in-memory backend.

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Current UTC time truncated to microseconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`, normally the current time.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}
