//! Temporal extent of an item.
//!
//! STAC items carry either a single `datetime` or a `start_datetime` /
//! `end_datetime` pair. [`Temporal`] models that choice and
//! [`Temporal::normalize`] picks one from loosely filled form input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Either an instant or a closed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// A single point in time.
    Instant(DateTime<Utc>),
    /// A time range with both ends set.
    Range {
        /// First instant of the range.
        start: DateTime<Utc>,
        /// Last instant of the range.
        end: DateTime<Utc>,
    },
}

impl Temporal {
    /// Choose between an instant and a range.
    ///
    /// A range is produced only when both ends are present and differ.
    /// Otherwise the instant is `datetime`, falling back to `start`.
    #[must_use]
    pub fn normalize(
        datetime: Option<DateTime<Utc>>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start != end {
                return Some(Self::Range { start, end });
            }
        }
        datetime.or(start).map(Self::Instant)
    }

    /// The instant, if this is not a range.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(dt) => Some(*dt),
            Self::Range { .. } => None,
        }
    }

    /// The start of the range, if this is a range.
    #[must_use]
    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Range { start, .. } => Some(*start),
            Self::Instant(_) => None,
        }
    }

    /// The end of the range, if this is a range.
    #[must_use]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Range { end, .. } => Some(*end),
            Self::Instant(_) => None,
        }
    }
}

impl std::fmt::Display for Temporal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instant(dt) => write!(f, "{}", format_datetime(dt)),
            Self::Range { start, end } => {
                write!(f, "{}/{}", format_datetime(start), format_datetime(end))
            }
        }
    }
}

/// Parse an RFC 3339 timestamp, a timestamp without offset such as
/// `2021-06-01T12:00:00` (read as UTC), or a plain `YYYY-MM-DD` date
/// (midnight UTC).
///
/// # Errors
///
/// Returns [`Error::InvalidItem`] if the input matches none of these formats.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::invalid_item(format!("invalid datetime '{input}'")))
}

/// Format a timestamp the way STAC expects it, with a `Z` suffix.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
