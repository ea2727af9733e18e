//! # Timestamp Coercion Policy
//!
//! This module resolves how temporal text is parsed and formatted per column:
//! a strftime-style format plus a timezone, with a cascading default (column
//! override, then builder default, then the hard-coded fallback in
//! [`crate::config::constants`]).
//!
//! ## Resolution
//!
//! The cascade is evaluated once, at setter-factory time, into a flat
//! `TimestampPolicy` per column; value coercion never re-evaluates it.
//!
//! ## Instants
//!
//! Parsed values are absolute instants as microseconds since the Unix epoch.
//! When the format itself carries an offset (`%z`, `%:z`, `%#z`, `%+`) the
//! parse is absolute on its own; otherwise the naive civil time is
//! interpreted in the policy timezone.
//!
//! ## Round Trip
//!
//! `parse(format(t)) == t` holds for any instant representable at the
//! format's precision; the default format keeps microseconds, so it holds
//! for every instant the page layout can store.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use eyre::Result;

use crate::config::constants::DEFAULT_TIMESTAMP_FORMAT;
use crate::error::ConfigurationError;

/// Timezone a naive civil time is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    Utc,
    Fixed(FixedOffset),
}

impl Timezone {
    /// Parses `"UTC"`, `"Z"`, or a fixed offset such as `"+09:00"`, `"+0900"`
    /// or `"-07"`. Fails with `ConfigurationError` on anything else; named
    /// zones are not supported at this layer.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("utc") || spec == "Z" {
            return Ok(Timezone::Utc);
        }

        let bad = || ConfigurationError::new(format!("unparseable timezone '{}'", spec));

        let (sign, rest) = match spec.as_bytes().first() {
            Some(b'+') => (1i32, &spec[1..]),
            Some(b'-') => (-1i32, &spec[1..]),
            _ => return Err(bad().into()),
        };

        // Accepted shapes after the sign: H, HH, HHMM, HH:MM.
        let parts: Vec<&str> = rest.split(':').collect();
        let (hour_part, minute_part) = match parts.as_slice() {
            [hm] if hm.len() == 4 => (&hm[..2], &hm[2..]),
            [h] if (1..=2).contains(&h.len()) => (*h, "0"),
            [h, m] if (1..=2).contains(&h.len()) && (1..=2).contains(&m.len()) => (*h, *m),
            _ => return Err(bad().into()),
        };
        if !hour_part.chars().all(|c| c.is_ascii_digit())
            || !minute_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(bad().into());
        }
        let hours = hour_part.parse::<i32>().map_err(|_| bad())?;
        let minutes = minute_part.parse::<i32>().map_err(|_| bad())?;
        if hours > 23 || minutes > 59 {
            return Err(bad().into());
        }

        let secs = sign * (hours * 3600 + minutes * 60);
        let offset = FixedOffset::east_opt(secs).ok_or_else(bad)?;
        Ok(Timezone::Fixed(offset))
    }

    fn fixed(&self) -> Option<FixedOffset> {
        match self {
            Timezone::Utc => None,
            Timezone::Fixed(off) => Some(*off),
        }
    }
}

/// Which level of the configuration cascade supplied a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySource {
    ColumnOverride,
    BuilderDefault,
}

/// Resolved per-column timestamp format and timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampPolicy {
    format: String,
    timezone: Timezone,
    source: PolicySource,
}

impl TimestampPolicy {
    /// Builds a policy, validating the format string up front so a bad
    /// pattern surfaces as a `ConfigurationError` at construction rather
    /// than a failure on the first record.
    pub fn new(format: impl Into<String>, timezone: Timezone, source: PolicySource) -> Result<Self> {
        let format = format.into();
        validate_format(&format)?;
        Ok(Self {
            format,
            timezone,
            source,
        })
    }

    /// Policy with the hard-coded fallback format, in the given timezone.
    pub fn with_default_format(timezone: Timezone, source: PolicySource) -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone,
            source,
        }
    }

    pub fn format_pattern(&self) -> &str {
        &self.format
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn source(&self) -> PolicySource {
        self.source
    }

    /// Parses temporal text into microseconds since the Unix epoch.
    ///
    /// The error message names the raw value and the format; the column
    /// setter wraps it with column identity.
    pub fn parse(&self, raw: &str) -> Result<i64> {
        if format_carries_offset(&self.format) {
            let dt = DateTime::parse_from_str(raw, &self.format).map_err(|e| {
                eyre::eyre!(
                    "'{}' does not match timestamp format '{}': {}",
                    raw,
                    self.format,
                    e
                )
            })?;
            return Ok(dt.timestamp_micros());
        }

        let naive = NaiveDateTime::parse_from_str(raw, &self.format).map_err(|e| {
            eyre::eyre!(
                "'{}' does not match timestamp format '{}': {}",
                raw,
                self.format,
                e
            )
        })?;
        let micros = match self.timezone.fixed() {
            None => naive.and_utc().timestamp_micros(),
            Some(off) => off
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| eyre::eyre!("'{}' is ambiguous in the policy timezone", raw))?
                .timestamp_micros(),
        };
        Ok(micros)
    }

    /// Renders an instant in the policy timezone with the policy format.
    pub fn format(&self, micros: i64) -> Result<String> {
        let dt = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| eyre::eyre!("timestamp {}us is out of range", micros))?;
        let mut out = String::new();
        let rendered = match self.timezone.fixed() {
            None => write!(out, "{}", dt.format(&self.format)),
            Some(off) => write!(out, "{}", dt.with_timezone(&off).format(&self.format)),
        };
        rendered.map_err(|_| eyre::eyre!("timestamp format '{}' failed to render", self.format))?;
        Ok(out)
    }
}

fn format_carries_offset(format: &str) -> bool {
    format.contains("%z") || format.contains("%:z") || format.contains("%#z") || format.contains("%+")
}

/// Renders a probe instant to reject malformed patterns early; chrono has no
/// standalone pattern validator.
fn validate_format(format: &str) -> Result<()> {
    let probe = Utc
        .timestamp_micros(0)
        .single()
        .ok_or_else(|| eyre::eyre!("probe instant out of range"))?;
    let mut out = String::new();
    if write!(out, "{}", probe.format(format)).is_err() {
        return Err(
            ConfigurationError::new(format!("unparseable timestamp format '{}'", format)).into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_default() -> TimestampPolicy {
        TimestampPolicy::with_default_format(Timezone::Utc, PolicySource::BuilderDefault)
    }

    #[test]
    fn parses_default_format_as_utc() {
        let policy = utc_default();
        let micros = policy.parse("2020-01-02 03:04:05.000000").unwrap();
        assert_eq!(micros, 1_577_934_245_000_000);
    }

    #[test]
    fn fixed_offset_shifts_the_instant() {
        let tz = Timezone::parse("+09:00").unwrap();
        let policy = TimestampPolicy::with_default_format(tz, PolicySource::ColumnOverride);
        let micros = policy.parse("2020-01-02 03:04:05.000000").unwrap();
        // 03:04:05 +09:00 is 18:04:05 UTC on the previous day
        assert_eq!(micros, 1_577_934_245_000_000 - 9 * 3600 * 1_000_000);
    }

    #[test]
    fn format_parse_round_trip_preserves_micros() {
        let policy = TimestampPolicy::with_default_format(
            Timezone::parse("-07:30").unwrap(),
            PolicySource::ColumnOverride,
        );
        for micros in [0i64, 1_577_934_245_123_456, -1_000_000, 987_654_321] {
            let text = policy.format(micros).unwrap();
            assert_eq!(policy.parse(&text).unwrap(), micros, "text was {}", text);
        }
    }

    #[test]
    fn offset_bearing_format_ignores_policy_timezone() {
        let policy = TimestampPolicy::new(
            "%Y-%m-%d %H:%M:%S %z",
            Timezone::parse("+09:00").unwrap(),
            PolicySource::ColumnOverride,
        )
        .unwrap();
        let micros = policy.parse("2020-01-02 03:04:05 +0000").unwrap();
        assert_eq!(micros, 1_577_934_245_000_000);
    }

    #[test]
    fn timezone_parse_accepts_common_forms() {
        assert_eq!(Timezone::parse("UTC").unwrap(), Timezone::Utc);
        assert_eq!(Timezone::parse("utc").unwrap(), Timezone::Utc);
        assert_eq!(Timezone::parse("Z").unwrap(), Timezone::Utc);

        let nine = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(Timezone::parse("+09:00").unwrap(), Timezone::Fixed(nine));
        assert_eq!(Timezone::parse("+0900").unwrap(), Timezone::Fixed(nine));
        assert_eq!(Timezone::parse("+9").unwrap(), Timezone::Fixed(nine));

        let back = FixedOffset::west_opt(7 * 3600 + 1800).unwrap();
        assert_eq!(Timezone::parse("-07:30").unwrap(), Timezone::Fixed(back));
    }

    #[test]
    fn timezone_parse_rejects_garbage() {
        for bad in ["", "Mars/Olympus", "+25:00", "+09:75", "9:00", "+1:2:3"] {
            let err = Timezone::parse(bad).unwrap_err();
            assert!(
                err.downcast_ref::<ConfigurationError>().is_some(),
                "expected ConfigurationError for {:?}",
                bad
            );
        }
    }

    #[test]
    fn parse_failure_names_value_and_format() {
        let policy = utc_default();
        let err = policy.parse("not a timestamp").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not a timestamp"));
        assert!(msg.contains(DEFAULT_TIMESTAMP_FORMAT));
    }
}
