//! # Temporal Types: UTC-Only Timestamps
//!
//! `Timestamp` records when the registry committed something: an
//! institution update, an issuance, a revocation, an event. These are
//! bookkeeping values only. They never participate in validity decisions,
//! and they are distinct from the opaque issue/graduation date strings a
//! certificate carries.
//!
//! Timestamps are UTC, truncated to seconds, and render as
//! `YYYY-MM-DDTHH:MM:SSZ`. Non-UTC or sub-second inputs are rejected at
//! parse time, and deserialization goes through the same parser, so a
//! snapshot cannot smuggle in an offset or a fractional second.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix and whole seconds are
    /// accepted.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        if dt.nanosecond() != 0 {
            return Err(CoreError::Validation(format!(
                "timestamp must have whole-second precision, got: {s:?}"
            )));
        }
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_iso8601()
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert!(!ts.to_iso8601().contains('.'));
        assert_eq!(Timestamp::parse(&ts.to_iso8601()).unwrap(), ts);
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2023-06-15T00:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2023-06-15T00:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2023-06-15T00:00:00+00:00").is_err());
        assert!(Timestamp::parse("2023-06-15T08:00:00+08:00").is_err());
    }

    #[test]
    fn test_parse_subseconds_rejected() {
        assert!(Timestamp::parse("2023-06-15T00:00:00.5Z").is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("2023-06-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2023-06-15T00:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-06-15T00:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn test_deserialize_enforces_utc_whole_seconds() {
        assert!(serde_json::from_str::<Timestamp>("\"2023-06-15T08:00:00.5+08:00\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("\"2023-06-15T08:00:00+08:00\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("\"2023-06-15T08:00:00.5Z\"").is_err());
    }
}
