//! Time utilities: calendar-date parsing and the timezone-aware "today".

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Date-only layouts accepted for due dates, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Timestamp layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a due date such as "2026-02-20", "02/20/2026", "Feb 20, 2026" or
/// "2026-02-20T09:00:00Z" into a calendar date.
///
/// Timestamps are truncated to the date written in them; no timezone
/// conversion is applied, so "2026-02-20T23:30:00-06:00" is Feb 20.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.date())
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// The calendar date at instant `now` in `tz`.
pub fn date_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Today's date in the named IANA timezone.
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    Ok(date_in(parse_timezone(tz)?, Utc::now()))
}

/// Whole days from `today` until `due` (negative when overdue).
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}
