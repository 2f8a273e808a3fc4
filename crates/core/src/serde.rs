//! Serde helpers for quote timestamps.
//!
//! Recency ordering happens on the stored string, so every timestamp is
//! written as RFC 3339 with exactly three fractional digits and a `Z`
//! suffix. With a fixed width, lexical order equals chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Formats a timestamp in the canonical sortable form.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use quotes_core::serde::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-06-15T10:30:00.000Z");
/// ```
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Drops sub-millisecond precision so a value survives a format/parse cycle unchanged.
pub fn truncate_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// `#[serde(with = "crate::serde::timestamp")]` for `DateTime<Utc>` fields.
pub mod timestamp {
    use super::*;

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "crate::serde::optional_timestamp")]` for `Option<DateTime<Utc>>` fields.
pub mod optional_timestamp {
    use super::*;

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_some(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) if !s.trim().is_empty() => parse_timestamp(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(with = "timestamp")]
        at: DateTime<Utc>,
        #[serde(default, with = "optional_timestamp")]
        maybe: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_format_has_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(7);

        assert_eq!(format_timestamp(&whole), "2024-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(&fractional), "2024-01-01T00:00:00.007Z");
    }

    #[test]
    fn test_lexical_order_matches_chronological_order() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 9, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_truncate_survives_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let truncated = truncate_timestamp(ts);

        assert_eq!(
            parse_timestamp(&format_timestamp(&truncated)).unwrap(),
            truncated
        );
    }

    #[test]
    fn test_serde_helpers() {
        let json = r#"{"at":"2024-06-15T10:30:00.250Z","maybe":""}"#;
        let parsed: TestStruct = serde_json::from_str(json).unwrap();

        assert_eq!(
            parsed.at,
            Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
                + chrono::Duration::milliseconds(250)
        );
        assert_eq!(parsed.maybe, None);

        let encoded = serde_json::to_string(&parsed).unwrap();
        assert_eq!(encoded, r#"{"at":"2024-06-15T10:30:00.250Z","maybe":null}"#);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let json = r#"{"at":"yesterday"}"#;
        assert!(serde_json::from_str::<TestStruct>(json).is_err());
    }
}
