// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp back into UTC.
///
/// Returns `None` on malformed input rather than erroring; callers treat
/// an unparseable timestamp the same as a missing one.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_round_trip() {
        let now = Utc::now();
        let formatted = format_utc_rfc3339(now);
        let parsed = parse_rfc3339(&formatted).expect("should parse");
        assert_eq!(parsed.timestamp(), now.timestamp());
    }

    #[test]
    fn test_parse_rfc3339_malformed() {
        assert!(parse_rfc3339("not a timestamp").is_none());
        assert!(parse_rfc3339("").is_none());
    }
}
