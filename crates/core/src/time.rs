//! Message timestamps.
//!
//! Legacy logs carry ISO-8601 instants; streaming logs have no clock at all
//! and get synthetic `#<n>` ordinals assigned by the adapter. Both end up in
//! [`Timestamp`], and a single log only ever uses one scheme.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Timestamp {
    /// Synthetic ordinal assigned during streaming adaptation.
    Sequence(u64),
    /// Whatever the legacy record carried, usually an ISO-8601 instant.
    Raw(String),
}

impl Timestamp {
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Sequence(n) => format!("#{n}").into(),
            Self::Raw(raw) => raw.as_str().into(),
        }
    }

    /// True for sequence markers, including `#`-prefixed raw strings.
    pub fn is_synthetic(&self) -> bool {
        match self {
            Self::Sequence(_) => true,
            Self::Raw(raw) => raw.starts_with('#'),
        }
    }

    /// Parse as a real instant. Synthetic markers never parse.
    pub fn instant(&self) -> Option<IsoInstant> {
        match self {
            Self::Sequence(_) => None,
            Self::Raw(raw) if raw.starts_with('#') => None,
            Self::Raw(raw) => IsoInstant::parse(raw),
        }
    }

    /// Display form for the message list: ordinals pass through, instants are
    /// formatted in `zone` with `format`, anything unparseable is shown raw.
    pub fn display(&self, zone: DisplayTimezone, format: &str) -> String {
        if self.is_synthetic() {
            return self.as_str().into_owned();
        }
        match self.instant() {
            Some(instant) => instant.format(zone, format),
            None => {
                tracing::debug!("Unparseable timestamp {:?}; showing raw", self.as_str());
                self.as_str().into_owned()
            }
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        match raw.strip_prefix('#').and_then(|n| n.parse::<u64>().ok()) {
            Some(n) if raw == format!("#{n}") => Self::Sequence(n),
            _ => Self::Raw(raw),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        match ts {
            Timestamp::Sequence(n) => format!("#{n}"),
            Timestamp::Raw(raw) => raw,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Time zone used when rendering real instants.
///
/// `Source` keeps each instant's own offset, so a report reads the same on
/// every machine. `Local` converts to the zone of the host generating the
/// report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTimezone {
    #[default]
    Source,
    Local,
    Utc,
}

/// A parsed ISO-8601 instant. Strings without an offset stay naive; naive and
/// offset-carrying instants cannot be compared with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoInstant {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

impl IsoInstant {
    /// Parse an ISO-8601 string, accepting a `Z` suffix as UTC.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace('Z', "+00:00");
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Some(Self::Aware(dt));
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
                return Some(Self::Aware(dt));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                return Some(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
    }

    /// Seconds from `self` to `later`; `None` when one side is naive and the
    /// other is not.
    pub fn seconds_until(&self, later: &IsoInstant) -> Option<f64> {
        let delta = match (self, later) {
            (Self::Aware(a), Self::Aware(b)) => b.signed_duration_since(*a),
            (Self::Naive(a), Self::Naive(b)) => b.signed_duration_since(*a),
            _ => return None,
        };
        delta
            .num_microseconds()
            .map(|us| us as f64 / 1_000_000.0)
            .or_else(|| Some(delta.num_milliseconds() as f64 / 1000.0))
    }

    /// Format for display. Naive instants have no zone and are formatted as-is.
    pub fn format(&self, zone: DisplayTimezone, format: &str) -> String {
        match (self, zone) {
            (Self::Aware(dt), DisplayTimezone::Source) => dt.format(format).to_string(),
            (Self::Aware(dt), DisplayTimezone::Local) => {
                dt.with_timezone(&Local).format(format).to_string()
            }
            (Self::Aware(dt), DisplayTimezone::Utc) => {
                dt.with_timezone(&Utc).format(format).to_string()
            }
            (Self::Naive(dt), _) => dt.format(format).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_markers_parse_from_strings() {
        assert_eq!(Timestamp::from("#12"), Timestamp::Sequence(12));
        assert_eq!(Timestamp::Sequence(3).as_str(), "#3");
        assert!(Timestamp::from("#abc").is_synthetic());
        assert_eq!(Timestamp::from("#abc"), Timestamp::Raw("#abc".to_string()));
        assert_eq!(Timestamp::from("#007"), Timestamp::Raw("#007".to_string()));
        assert!(!Timestamp::from("2026-01-01T00:00:00Z").is_synthetic());
    }

    #[test]
    fn parses_z_suffix_offsets_and_naive_forms() {
        assert!(matches!(
            IsoInstant::parse("2026-02-28T12:00:00Z"),
            Some(IsoInstant::Aware(_))
        ));
        assert!(matches!(
            IsoInstant::parse("2026-02-28T12:00:00.123456+09:00"),
            Some(IsoInstant::Aware(_))
        ));
        assert!(matches!(
            IsoInstant::parse("2026-02-28T12:00:00.5"),
            Some(IsoInstant::Naive(_))
        ));
        assert!(matches!(
            IsoInstant::parse("2026-02-28"),
            Some(IsoInstant::Naive(_))
        ));
        assert!(IsoInstant::parse("yesterday").is_none());
        assert!(IsoInstant::parse("").is_none());
    }

    #[test]
    fn seconds_until_requires_matching_awareness() {
        let a = IsoInstant::parse("2026-02-28T12:00:00Z").unwrap();
        let b = IsoInstant::parse("2026-02-28T12:01:30.5Z").unwrap();
        assert_eq!(a.seconds_until(&b), Some(90.5));

        let naive = IsoInstant::parse("2026-02-28T12:05:00").unwrap();
        assert_eq!(a.seconds_until(&naive), None);
    }

    #[test]
    fn display_passes_through_sequences_and_unparseable() {
        assert_eq!(
            Timestamp::Sequence(4).display(DisplayTimezone::Utc, "%H:%M:%S"),
            "#4"
        );
        assert_eq!(
            Timestamp::from("not a time").display(DisplayTimezone::Utc, "%H:%M:%S"),
            "not a time"
        );
        assert_eq!(
            Timestamp::from("2026-02-28T12:34:56Z").display(DisplayTimezone::Utc, "%H:%M:%S"),
            "12:34:56"
        );
        assert_eq!(
            Timestamp::from("2026-02-28T23:10:00+09:00")
                .display(DisplayTimezone::Utc, "%H:%M:%S"),
            "14:10:00"
        );
    }

    #[test]
    fn source_display_keeps_the_recorded_offset() {
        let ts = Timestamp::from("2026-02-28T23:10:00+09:00");
        assert_eq!(ts.display(DisplayTimezone::Source, "%H:%M:%S"), "23:10:00");
        assert_eq!(ts.display(DisplayTimezone::default(), "%H:%M"), "23:10");
        assert_eq!(
            Timestamp::from("2026-02-28T12:34:56Z").display(DisplayTimezone::Source, "%H:%M:%S"),
            "12:34:56"
        );
    }

    #[test]
    fn local_display_has_clock_shape() {
        let shown =
            Timestamp::from("2026-02-28T12:34:56Z").display(DisplayTimezone::Local, "%H:%M:%S");
        assert_eq!(shown.len(), 8);
        assert_eq!(shown.matches(':').count(), 2);
    }
}
