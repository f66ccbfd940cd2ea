//! # Time Helpers
//!
//! Every user-facing timestamp in the tracker is anchored to Philippine
//! time, independent of the host machine's locale or timezone. Keeping the
//! conversion in one place means the feed handler, the last-seen reports,
//! and the rendered notifications can never disagree about what "now" is.

use chrono::{DateTime, Utc};
use chrono_tz::Asia::Manila;
use chrono_tz::Tz;

/// Returns the current time in the Asia/Manila timezone.
pub fn manila_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Manila)
}

/// Renders the age of `then` relative to `now` using the coarsest unit that
/// does not round down to zero: seconds under a minute, minutes under an
/// hour, hours under a day, days otherwise.
pub fn time_ago(then: DateTime<Tz>, now: DateTime<Tz>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        format!("{}s ago", secs)
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", days)
    }
}

/// Display timestamp for outgoing messages, e.g. `06 Aug 2026, 1:23:45 PM`.
pub fn stamp(now: DateTime<Tz>) -> String {
    now.format("%d %b %Y, %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Tz> {
        Manila.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_time_ago_buckets() {
        let base = at(0);

        // 1. Under a minute stays in seconds
        assert_eq!(time_ago(base, at(0)), "0s ago");
        assert_eq!(time_ago(base, at(59)), "59s ago");

        // 2. Under an hour rolls up to minutes
        assert_eq!(time_ago(base, at(60)), "1m ago");
        assert_eq!(time_ago(base, at(59 * 60 + 59)), "59m ago");

        // 3. Under a day rolls up to hours
        assert_eq!(time_ago(base, at(60 * 60)), "1h ago");
        assert_eq!(time_ago(base, at(23 * 60 * 60 + 59 * 60)), "23h ago");

        // 4. Everything else is counted in days
        assert_eq!(time_ago(base, at(24 * 60 * 60)), "1d ago");
        assert_eq!(time_ago(base, at(3 * 24 * 60 * 60 + 60)), "3d ago");
    }

    #[test]
    fn test_time_ago_never_negative() {
        // A clock skew between observers must not render a negative age.
        assert_eq!(time_ago(at(30), at(0)), "0s ago");
    }

    #[test]
    fn test_stamp_rendering() {
        let when = Manila.with_ymd_and_hms(2025, 8, 6, 13, 4, 5).unwrap();
        assert_eq!(stamp(when), "06 Aug 2025, 1:04:05 PM");

        let morning = Manila.with_ymd_and_hms(2025, 12, 1, 0, 30, 0).unwrap();
        assert_eq!(stamp(morning), "01 Dec 2025, 12:30:00 AM");
    }
}
