//! Date parsing and display formats.
//!
//! The `date:` header is free text. [`parse_date`] accepts the handful of
//! shapes authors actually type and treats everything else as "no date".
//! Naive values (no offset) are read as UTC so the same file renders the same
//! label on every machine.
//!
//! Two formatters work from the raw string independently:
//!
//! - [`format_date_label`]: `Mar 2, 2024`, shown on cards and entry pages.
//! - [`format_feed_date`]: `Sat, 02 Mar 2024 00:00:00 GMT`, for `pubDate` and
//!   `lastBuildDate`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// `%B` and `%b` both accept full and abbreviated month names when parsing.
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%d %B %Y"];

/// Parse a header date. Returns `None` for empty or unrecognized input.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Human label: abbreviated English month, day without padding, year.
pub fn format_date_label(raw: &str) -> String {
    parse_date(raw)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// RFC 1123 date for feed items.
pub fn format_feed_date(raw: &str) -> String {
    parse_date(raw).map(rfc1123).unwrap_or_default()
}

/// Format an instant as RFC 1123 (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn rfc1123(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_from_iso_date() {
        assert_eq!(format_date_label("2024-01-01"), "Jan 1, 2024");
        assert_eq!(format_date_label("2023-11-23"), "Nov 23, 2023");
    }

    #[test]
    fn label_from_datetime_variants() {
        assert_eq!(format_date_label("2024-03-02T10:30:00Z"), "Mar 2, 2024");
        assert_eq!(format_date_label("2024-03-02 10:30"), "Mar 2, 2024");
        assert_eq!(format_date_label("2024/03/02"), "Mar 2, 2024");
    }

    #[test]
    fn label_from_written_month() {
        assert_eq!(format_date_label("March 2, 2024"), "Mar 2, 2024");
        assert_eq!(format_date_label("Mar 2, 2024"), "Mar 2, 2024");
        assert_eq!(format_date_label("23 November 2023"), "Nov 23, 2023");
        assert_eq!(format_feed_date("March 2, 2024"), "Sat, 02 Mar 2024 00:00:00 GMT");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        assert_eq!(format_date_label("2024-03-02T23:30:00-05:00"), "Mar 3, 2024");
    }

    #[test]
    fn label_from_rfc2822() {
        assert_eq!(
            format_date_label("Sat, 02 Mar 2024 09:00:00 +0000"),
            "Mar 2, 2024"
        );
    }

    #[test]
    fn unparseable_is_empty() {
        assert_eq!(format_date_label(""), "");
        assert_eq!(format_date_label("someday"), "");
        assert_eq!(format_date_label("2024-13-45"), "");
        assert_eq!(format_feed_date("soon"), "");
    }

    #[test]
    fn feed_date_is_rfc1123() {
        assert_eq!(format_feed_date("2024-01-01"), "Mon, 01 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn parse_orders_chronologically() {
        let a = parse_date("2024-01-01").unwrap();
        let b = parse_date("2024-01-01T12:00:00Z").unwrap();
        assert!(a < b);
    }
}
