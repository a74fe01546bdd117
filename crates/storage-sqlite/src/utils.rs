//! Parsing helpers for TEXT-encoded columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a TEXT-encoded decimal, falling back to zero on malformed data.
pub fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!(
                "Failed to parse {} '{}' as Decimal: {}. Falling back to ZERO.",
                field_name,
                value,
                err
            );
            Decimal::ZERO
        }
    }
}

/// Formats a timestamp for storage. RFC 3339 in UTC, so lexicographic order
/// matches chronological order.
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Parses a TEXT-encoded timestamp, falling back to the epoch on malformed
/// data.
pub fn parse_datetime(value: &str, field_name: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => {
            log::error!(
                "Failed to parse {} '{}' as RFC 3339 timestamp: {}. Falling back to epoch.",
                field_name,
                value,
                err
            );
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

/// Parses an optional TEXT-encoded timestamp.
pub fn parse_optional_datetime(value: Option<&str>, field_name: &str) -> Option<DateTime<Utc>> {
    value.map(|v| parse_datetime(v, field_name))
}
