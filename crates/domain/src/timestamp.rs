// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage timestamp format.
//!
//! Timestamps are persisted as fixed-width UTC text with second precision,
//! so that lexicographic comparison in SQL matches chronological order.

use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Formats an instant as a storage timestamp (`YYYY-MM-DDTHH:MM:SSZ`).
///
/// Sub-second precision is dropped.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented in the format.
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: instant.to_string(),
            error: e.to_string(),
        })
}

/// Parses a storage timestamp back into a UTC instant.
///
/// # Errors
///
/// Returns an error if the string is not in storage format.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Rewrites any RFC 3339 timestamp into storage format.
///
/// Offsets are converted to UTC and sub-second precision is dropped, so
/// `2026-10-19T09:00:00+05:00` becomes `2026-10-19T04:00:00Z`.
///
/// # Errors
///
/// Returns an error if the value is not an RFC 3339 timestamp.
pub fn normalize_timestamp(value: &str) -> Result<String, DomainError> {
    let instant: OffsetDateTime =
        OffsetDateTime::parse(value, &Rfc3339).map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })?;
    format_timestamp(instant)
}

/// Validates a calendar date in storage format (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns an error if the value is not a real date in that format.
pub fn normalize_date(value: &str) -> Result<String, DomainError> {
    let invalid = |e: &dyn std::fmt::Display| DomainError::InvalidTimestamp {
        value: value.to_string(),
        error: e.to_string(),
    };
    let date: Date = Date::parse(value, DATE_FORMAT).map_err(|e| invalid(&e))?;
    date.format(DATE_FORMAT).map_err(|e| invalid(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_is_fixed_width_utc() {
        let instant = datetime!(2026-03-09 07:05:01.750 +02:00);
        assert_eq!(
            format_timestamp(instant).ok().as_deref(),
            Some("2026-03-09T05:05:01Z")
        );
    }

    #[test]
    fn test_parse_round_trips_at_second_precision() {
        let parsed = parse_timestamp("2026-10-19T12:00:00Z");
        assert_eq!(parsed.ok(), Some(datetime!(2026-10-19 12:00:00 UTC)));
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(parse_timestamp("2026-10-19 12:00:00").is_err());
        assert!(parse_timestamp("2026-10-19T12:00:00.5Z").is_err());
    }

    #[test]
    fn test_normalize_converts_offsets_to_utc() {
        assert_eq!(
            normalize_timestamp("2026-10-19T09:00:00+05:00").ok().as_deref(),
            Some("2026-10-19T04:00:00Z")
        );
        assert_eq!(
            normalize_timestamp("2026-10-19T12:00:00Z").ok().as_deref(),
            Some("2026-10-19T12:00:00Z")
        );
        assert!(normalize_timestamp("2026-10-19 12:00").is_err());
    }

    #[test]
    fn test_normalize_date_rejects_malformed_dates() {
        assert_eq!(
            normalize_date("2026-03-01").ok().as_deref(),
            Some("2026-03-01")
        );
        assert!(normalize_date("2026-3-1").is_err());
        assert!(normalize_date("2026-02-30").is_err());
        assert!(normalize_date("01/03/2026").is_err());
    }

    #[test]
    fn test_lexicographic_order_matches_time_order() {
        let earlier = format_timestamp(datetime!(2026-01-09 23:59:59 UTC)).ok();
        let later = format_timestamp(datetime!(2026-01-10 00:00:00 UTC)).ok();
        assert!(earlier < later);
    }
}
