//! Timestamp normalization for evidence records.
//!
//! Two entry points, chosen by how far the data source is trusted:
//!
//! - [`parse_lenient`] is for GH Archive payloads, which are known to carry
//!   malformed timestamps. It never fails and falls back to the current time.
//! - [`parse_strict`] is for GitHub API and git data. A malformed timestamp is
//!   a [`ParseError`].
//!
//! Everything returned is UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::ParseError;

/// Fallback patterns tried in order by both parsers.
///
/// Whatever zone information a pattern captures is dropped: the wall-clock
/// time is taken as UTC.
pub const FALLBACK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %Z",
    "%Y-%m-%d %H:%M:%S",
];

/// Zone names accepted by the `%Z` fallback pattern (case-insensitive)
const UTC_ZONE_NAMES: [&str; 2] = ["UTC", "GMT"];

/// ISO-8601 shapes with an explicit offset, extended and basic
const ISO_OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%:z",
    "%Y%m%dT%H%M%z",
];

/// ISO-8601 shapes without an offset, taken as UTC
const ISO_NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Source of "now" for the lenient fallback path
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant (for reproducible tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A timestamp as it arrives from a collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTimestamp<'a> {
    /// No value was supplied
    Missing,
    /// Already parsed upstream
    Parsed(DateTime<Utc>),
    /// Textual form still to be parsed
    Text(&'a str),
}

impl<'a> From<&'a str> for RawTimestamp<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for RawTimestamp<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for RawTimestamp<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl From<DateTime<Utc>> for RawTimestamp<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Parsed(value)
    }
}

impl From<Option<DateTime<Utc>>> for RawTimestamp<'_> {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Missing, Self::Parsed)
    }
}

/// Parse a timestamp from low-trust data, never failing.
///
/// Missing values and strings that match nothing become the current time.
pub fn parse_lenient<'a>(value: impl Into<RawTimestamp<'a>>) -> DateTime<Utc> {
    parse_lenient_with(value, &SystemClock)
}

/// [`parse_lenient`] with an explicit clock for the fallback path
pub fn parse_lenient_with<'a>(
    value: impl Into<RawTimestamp<'a>>,
    clock: &dyn Clock,
) -> DateTime<Utc> {
    match value.into() {
        RawTimestamp::Missing => clock.now(),
        RawTimestamp::Parsed(ts) => ts,
        RawTimestamp::Text(text) => {
            if let Some(ts) = parse_iso(text).or_else(|| parse_fallback(text)) {
                return ts;
            }
            tracing::warn!(value = text, "Unparseable timestamp, substituting current time");
            clock.now()
        }
    }
}

/// Parse a timestamp from trusted data.
///
/// `Missing` is a valid explicit absence and yields `Ok(None)`. Only the
/// fixed fallback patterns are accepted for text.
pub fn parse_strict<'a>(
    value: impl Into<RawTimestamp<'a>>,
) -> Result<Option<DateTime<Utc>>, ParseError> {
    match value.into() {
        RawTimestamp::Missing => Ok(None),
        RawTimestamp::Parsed(ts) => Ok(Some(ts)),
        RawTimestamp::Text(text) => parse_fallback(text)
            .map(Some)
            .ok_or_else(|| ParseError::new(text)),
    }
}

/// ISO-8601 fast path used by the lenient parser only.
///
/// A trailing `Z` is rewritten to `+00:00`. Values without an offset are
/// taken as UTC.
fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let normalized = match value.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => value.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ISO_OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&normalized, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in ISO_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    ["%Y-%m-%d", "%Y%m%d"]
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_fallback(value: &str) -> Option<DateTime<Utc>> {
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| parse_with_format(value, format))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse `value` with one fallback pattern, returning the wall-clock time.
fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    // chrono cannot parse zone abbreviations; only UTC aliases are accepted.
    if let Some(base) = format.strip_suffix(" %Z") {
        let (head, zone) = value.rsplit_once(' ')?;
        if !UTC_ZONE_NAMES.iter().any(|name| zone.eq_ignore_ascii_case(name)) {
            return None;
        }
        return NaiveDateTime::parse_from_str(head, base).ok();
    }

    if format.contains("%z") {
        return DateTime::parse_from_str(value, format)
            .ok()
            .map(|ts| ts.naive_local());
    }

    NaiveDateTime::parse_from_str(value, format).ok()
}

/// Canonical text form of a timestamp: RFC 3339, UTC, `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a timestamp field of a stored record: RFC 3339 first, then the
/// strict patterns.
pub fn parse_field(value: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    parse_fallback(value).ok_or_else(|| ParseError::new(value))
}

/// Serde codec for `DateTime<Utc>` evidence fields.
pub mod serde_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_field(&text).map_err(serde::de::Error::custom)
    }

    /// Same codec for optional fields; `null` means absent.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match ts {
                Some(ts) => serializer.serialize_str(&super::super::format_timestamp(ts)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|text| super::super::parse_field(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(utc(2000, 1, 1, 0, 0, 0))
    }

    #[test]
    fn test_strict_zulu() {
        let ts = parse_strict("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(ts, Some(utc(2024, 1, 15, 10, 30, 0)));
    }

    #[test]
    fn test_strict_garbage_fails() {
        let err = parse_strict("garbage").unwrap_err();
        assert_eq!(err.value, "garbage");
    }

    #[test]
    fn test_strict_missing_is_none() {
        assert_eq!(parse_strict(None::<&str>).unwrap(), None);
    }

    #[test]
    fn test_strict_passthrough() {
        let ts = utc(2023, 6, 1, 12, 0, 0);
        assert_eq!(parse_strict(ts).unwrap(), Some(ts));
    }

    #[test]
    fn test_strict_patterns() {
        let expected = Some(utc(2024, 1, 15, 10, 30, 0));
        assert_eq!(parse_strict("2024-01-15 10:30:00 UTC").unwrap(), expected);
        assert_eq!(parse_strict("2024-01-15 10:30:00").unwrap(), expected);
        assert_eq!(parse_strict("2024-01-15T10:30:00+0000").unwrap(), expected);
    }

    #[test]
    fn test_strict_zone_names() {
        let expected = Some(utc(2024, 1, 15, 10, 30, 0));
        assert_eq!(parse_strict("2024-01-15 10:30:00 GMT").unwrap(), expected);
        assert_eq!(parse_strict("2024-01-15 10:30:00 utc").unwrap(), expected);

        let err = parse_strict("2024-01-15 10:30:00 XYZ").unwrap_err();
        assert_eq!(err.value, "2024-01-15 10:30:00 XYZ");
    }

    #[test]
    fn test_strict_drops_zone_offset() {
        // Wall-clock time is kept and labelled UTC.
        let ts = parse_strict("2024-01-15T10:30:00+0530").unwrap();
        assert_eq!(ts, Some(utc(2024, 1, 15, 10, 30, 0)));
    }

    #[test]
    fn test_strict_rejects_fractional_iso() {
        assert!(parse_strict("2024-01-15T10:30:00.123Z").is_err());
        assert!(parse_strict("2024-01-15").is_err());
    }

    #[test]
    fn test_lenient_iso_with_offset_converts() {
        let ts = parse_lenient_with("2024-01-15T12:30:00+02:00", &clock());
        assert_eq!(ts, utc(2024, 1, 15, 10, 30, 0));
    }

    #[test]
    fn test_lenient_iso_variants() {
        let c = clock();
        assert_eq!(
            parse_lenient_with("2024-01-15T10:30:00Z", &c),
            utc(2024, 1, 15, 10, 30, 0)
        );
        assert_eq!(
            parse_lenient_with("2024-01-15T10:30:00", &c),
            utc(2024, 1, 15, 10, 30, 0)
        );
        assert_eq!(
            parse_lenient_with("2024-01-15 10:30", &c),
            utc(2024, 1, 15, 10, 30, 0)
        );
        assert_eq!(parse_lenient_with("2024-01-15", &c), utc(2024, 1, 15, 0, 0, 0));
        let fractional = parse_lenient_with("2024-01-15T10:30:00.250Z", &c);
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_lenient_iso_basic_format() {
        let c = clock();
        let expected = utc(2024, 1, 15, 10, 30, 0);
        assert_eq!(parse_lenient_with("20240115T103000Z", &c), expected);
        assert_eq!(parse_lenient_with("20240115T103000", &c), expected);
        assert_eq!(parse_lenient_with("20240115T123000+0200", &c), expected);
        assert_eq!(parse_lenient_with("20240115T1030", &c), expected);
        assert_eq!(parse_lenient_with("20240115", &c), utc(2024, 1, 15, 0, 0, 0));
    }

    #[test]
    fn test_lenient_fallback_pattern() {
        let ts = parse_lenient_with("2024-01-15 10:30:00 UTC", &clock());
        assert_eq!(ts, utc(2024, 1, 15, 10, 30, 0));
    }

    #[test]
    fn test_lenient_garbage_uses_clock() {
        for garbage in ["not a date", "", "2024-13-45", "yesterday", "1705314600"] {
            assert_eq!(parse_lenient_with(garbage, &clock()), clock().0, "{garbage}");
        }
    }

    #[test]
    fn test_lenient_missing_uses_clock() {
        assert_eq!(parse_lenient_with(None::<&str>, &clock()), clock().0);
    }

    #[test]
    fn test_lenient_system_clock_never_panics() {
        let before = Utc::now();
        let ts = parse_lenient("not a date");
        assert!(ts >= before);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(&utc(2024, 1, 15, 10, 30, 0)),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn test_parse_field_accepts_rfc3339_and_patterns() {
        let expected = utc(2024, 1, 15, 10, 30, 0);
        assert_eq!(parse_field("2024-01-15T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_field("2024-01-15T10:30:00+00:00").unwrap(), expected);
        assert_eq!(parse_field("2024-01-15 10:30:00").unwrap(), expected);
        assert!(parse_field("nope").is_err());
    }
}
