//! Reporting window for waiver results.

use common::config::DEFAULT_RECENCY_WINDOW_SECS;

/// `true` iff `now - timestamp < window_secs`.
///
/// Future timestamps (clock skew) count as recent.
pub fn is_recent_within(timestamp: i64, now: i64, window_secs: i64) -> bool {
    now.saturating_sub(timestamp) < window_secs
}

/// One day plus a 15 minute grace period.
pub fn is_recent(timestamp: i64, now: i64) -> bool {
    is_recent_within(timestamp, now, DEFAULT_RECENCY_WINDOW_SECS)
}
