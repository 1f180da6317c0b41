//! Canonical row keys for observation timestamps.
//!
//! Every accepted wire form is reduced to a UTC instant at millisecond
//! precision and rendered as `YYYY-MM-DDTHH:MM:SS.mmmZ`. Two observations
//! for the same instant always produce the same key, and keys sort the same
//! way lexicographically as their instants do in time.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::ViewError;
use crate::types::WireTimestamp;

/// Naive layouts the service emits. Naive values are stored as UTC upstream.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A normalized timestamp: the instant plus its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeKey {
    instant: DateTime<Utc>,
    key: String,
}

impl TimeKey {
    fn from_instant(instant: DateTime<Utc>) -> Result<Self, String> {
        // Collapse sub-millisecond precision so near-identical wire values collide.
        let instant = DateTime::from_timestamp_millis(instant.timestamp_millis())
            .ok_or_else(|| "instant out of range".to_string())?;
        Ok(Self {
            key: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            instant,
        })
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Normalize a wire timestamp into its row key.
pub fn normalize(raw: &WireTimestamp) -> Result<TimeKey, ViewError> {
    let invalid = |reason: String| ViewError::InvalidTimestamp {
        raw: raw.to_string(),
        reason,
    };

    let instant = match raw {
        WireTimestamp::Text(text) => parse_text(text).map_err(invalid)?,
        WireTimestamp::EpochMillis(ms) => {
            if !ms.is_finite() {
                return Err(invalid("epoch milliseconds are not finite".to_string()));
            }
            DateTime::from_timestamp_millis(ms.floor() as i64)
                .ok_or_else(|| invalid("epoch milliseconds out of range".to_string()))?
        }
    };

    TimeKey::from_instant(instant).map_err(invalid)
}

fn parse_text(text: &str) -> Result<DateTime<Utc>, String> {
    let value = text.trim();
    if value.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(ndt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(ndt.and_utc());
        }
    }

    Err("unrecognized timestamp format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> String {
        normalize(&WireTimestamp::from(raw)).unwrap().to_string()
    }

    #[test]
    fn test_equivalent_forms_collide() {
        let expected = "2024-05-01T12:00:00.000Z";
        assert_eq!(key("2024-05-01T12:00:00Z"), expected);
        assert_eq!(key("2024-05-01T14:00:00+02:00"), expected);
        assert_eq!(key("2024-05-01T12:00:00"), expected);
        assert_eq!(key("2024-05-01 12:00:00"), expected);
        assert_eq!(key("2024-05-01T12:00:00.000000"), expected);
        assert_eq!(key(" 2024-05-01T12:00:00Z "), expected);

        let millis = normalize(&WireTimestamp::EpochMillis(1714564800000.0)).unwrap();
        assert_eq!(millis.as_str(), expected);
    }

    #[test]
    fn test_sub_millisecond_precision_collapses() {
        assert_eq!(
            key("2024-05-01T12:00:00.123456"),
            key("2024-05-01T12:00:00.123999")
        );
        assert_eq!(key("2024-05-01T12:00:00.123456"), "2024-05-01T12:00:00.123Z");
    }

    #[test]
    fn test_fractional_millis_round_toward_earlier_instant() {
        let key = |ms: f64| normalize(&WireTimestamp::EpochMillis(ms)).unwrap().to_string();
        assert_eq!(key(0.5), "1970-01-01T00:00:00.000Z");
        assert_eq!(key(-0.5), "1969-12-31T23:59:59.999Z");
        assert_eq!(key(-1.0), "1969-12-31T23:59:59.999Z");
        assert_eq!(key(1714564800000.9), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        assert_eq!(key("2024-05-01"), "2024-05-01T00:00:00.000Z");
    }

    #[test]
    fn test_keys_sort_like_instants() {
        let a = normalize(&WireTimestamp::from("2024-05-01T09:00:00+00:00")).unwrap();
        let b = normalize(&WireTimestamp::from("2024-05-01T10:30:00+01:00")).unwrap();
        let c = normalize(&WireTimestamp::from("2024-05-02T00:00:00")).unwrap();
        // b is 09:30 UTC
        assert!(a < b && b < c);
        assert!(a.as_str() < b.as_str() && b.as_str() < c.as_str());
    }

    #[test]
    fn test_unparsable_timestamp_is_rejected() {
        for raw in ["", "   ", "yesterday", "2024-13-01T00:00:00", "05/01/2024"] {
            let err = normalize(&WireTimestamp::from(raw)).unwrap_err();
            assert!(
                matches!(err, ViewError::InvalidTimestamp { .. }),
                "expected InvalidTimestamp for {raw:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_millis_rejected() {
        let err = normalize(&WireTimestamp::EpochMillis(f64::NAN)).unwrap_err();
        assert!(matches!(err, ViewError::InvalidTimestamp { .. }));
        let err = normalize(&WireTimestamp::EpochMillis(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, ViewError::InvalidTimestamp { .. }));
    }
}
