//! Compiled path formats and decoding.
//!
//! A format is compiled once into a regular expression with one capture group
//! per placeholder occurrence, plus the occurrence sequence itself. Capture
//! groups are positional, so the Nth group always belongs to the Nth
//! placeholder in the format. Literal text is escaped, which means a format can
//! never inject its own pattern syntax.

use crate::error::{Error, ErrorKind, Result};
use crate::placeholder::{Placeholder, Token, placeholders, tokenize};
use crate::prefix::common_prefix;
use crate::segment::SegmentPath;
use crate::zone::zone_seconds;
use exn::ResultExt;
use regex::Regex;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use tracing::{debug, instrument, trace};

/// A format string compiled for decoding.
///
/// Cheap to share: decoding only reads it, so a single instance can serve any
/// number of threads. Build one per distinct format and keep it around rather
/// than calling [`decode`] for every path.
///
/// ```
/// use recstore_path::PathFormat;
/// use time::{UtcOffset, macros::datetime};
///
/// let format: PathFormat = "%path/%Y-%m-%d_%H-%M-%S-%f.mp4".parse().unwrap();
/// let format = format.with_fallback_offset(UtcOffset::UTC);
/// let segment = format.decode("cam1/2024-05-01_12-30-00-000250.mp4").unwrap();
/// assert_eq!(segment.path, "cam1");
/// assert_eq!(segment.start, datetime!(2024-05-01 12:30:00.000250 UTC));
///
/// assert!(format.decode("cam1/latest.mp4").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathFormat {
    format: String,
    regex: Regex,
    placeholders: Vec<Placeholder>,
    fallback_offset: Option<UtcOffset>,
}

impl FromStr for PathFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for PathFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.format)
    }
}

impl PathFormat {
    /// Compiles `format`.
    ///
    /// Paths decoded without a `%z` capture are placed in the system's local
    /// offset; see [`with_fallback_offset`](Self::with_fallback_offset).
    #[instrument(level = "debug", skip_all, fields(format))]
    pub fn new(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        tracing::Span::current().record("format", format.as_str());
        let mut pattern = String::with_capacity(format.len() * 2 + 6);
        pattern.push_str("^(?:");
        for token in tokenize(&format) {
            match token {
                Token::Literal(literal) => pattern.push_str(&regex::escape(literal)),
                Token::Placeholder(placeholder) => pattern.push_str(placeholder.pattern()),
            }
        }
        pattern.push_str(")$");
        let regex = Regex::new(&pattern).or_raise(|| ErrorKind::Pattern(format.clone()))?;
        let placeholders = placeholders(&format);
        debug_assert_eq!(regex.captures_len(), placeholders.len() + 1);
        Ok(Self {
            format,
            regex,
            placeholders,
            fallback_offset: None,
        })
    }

    /// Uses `offset` instead of the system's local offset for decoded paths
    /// that carry no `%z`.
    pub fn with_fallback_offset(mut self, offset: impl Into<Option<UtcOffset>>) -> Self {
        self.fallback_offset = offset.into();
        self
    }

    /// The format string this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.format
    }

    /// The placeholder occurrence sequence, duplicates included.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Returns `true` if the format mentions `placeholder` at least once.
    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.placeholders.contains(&placeholder)
    }

    /// See [`common_prefix`].
    pub fn common_prefix(&self) -> &str {
        common_prefix(&self.format)
    }

    /// See [`SegmentPath::encode`].
    pub fn encode(&self, segment: &SegmentPath) -> String {
        segment.encode(&self.format)
    }

    /// Returns a new format with every occurrence of `placeholder` replaced by
    /// the literal `value`.
    ///
    /// Narrowing `%path` this way gives a longer [`common_prefix`] to scan
    /// from. Fails if `value` contains placeholders of its own.
    ///
    /// ```
    /// use recstore_path::{PathFormat, Placeholder};
    ///
    /// let format: PathFormat = "rec/%path/%s.mp4".parse().unwrap();
    /// let narrowed = format.substitute(Placeholder::Path, "cam1").unwrap();
    /// assert_eq!(narrowed.as_str(), "rec/cam1/%s.mp4");
    /// assert_eq!(narrowed.common_prefix(), "rec/cam1");
    /// ```
    pub fn substitute(&self, placeholder: Placeholder, value: &str) -> Result<Self> {
        if !placeholders(value).is_empty() {
            exn::bail!(ErrorKind::Substitution(value.to_string()));
        }
        let format: String = tokenize(&self.format)
            .map(|token| match token {
                Token::Placeholder(p) if p == placeholder => value,
                Token::Placeholder(p) => p.as_str(),
                Token::Literal(literal) => literal,
            })
            .collect();
        Ok(Self::new(format)?.with_fallback_offset(self.fallback_offset))
    }

    /// Recovers the segment metadata from a path produced by this format.
    ///
    /// The whole of `candidate` must match. Returns `None` if it doesn't, or
    /// if the captured values don't make up a representable timestamp.
    pub fn decode(&self, candidate: &str) -> Option<SegmentPath> {
        let Some(captures) = self.regex.captures(candidate) else {
            trace!(format = %self.format, candidate, "path does not match format");
            return None;
        };
        let mut fields = Fields::default();
        let values = captures.iter().skip(1).map(|m| m.map_or("", |m| m.as_str()));
        for (placeholder, value) in self.placeholders.iter().zip(values) {
            fields.set(*placeholder, value)?;
        }
        let start = fields.start(self.fallback_offset)?;
        Some(SegmentPath {
            start,
            path: fields.path.to_string(),
            ship_name: fields.ship_name.to_string(),
        })
    }
}

/// Decodes `candidate` against `format`, compiling the format on the way.
///
/// Prefer a long-lived [`PathFormat`] when decoding more than one path.
///
/// ```
/// use recstore_path::decode;
///
/// assert!(decode("%Y-%m-%d.mp4", "not-a-date.mp4").is_none());
/// let segment = decode("%Y/%Y.mp4", "2023/2024.mp4").unwrap();
/// assert_eq!(segment.start.year(), 2024);
/// ```
pub fn decode(format: &str, candidate: &str) -> Option<SegmentPath> {
    PathFormat::new(format).ok()?.decode(candidate)
}

/// Values captured from one candidate path. Later captures of the same
/// placeholder overwrite earlier ones.
struct Fields<'h> {
    path: &'h str,
    ship_name: &'h str,
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    microsecond: i64,
    zone: Option<&'h str>,
    unix_seconds: i64,
}

impl Default for Fields<'_> {
    fn default() -> Self {
        Self {
            path: "",
            ship_name: "",
            year: 0,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            zone: None,
            unix_seconds: -1,
        }
    }
}

impl<'h> Fields<'h> {
    fn set(&mut self, placeholder: Placeholder, value: &'h str) -> Option<()> {
        // Patterns only ever capture digits for numeric placeholders.
        let number = || value.parse::<i64>().ok();
        match placeholder {
            Placeholder::Path => self.path = value,
            Placeholder::ShipName => self.ship_name = value,
            Placeholder::Year => self.year = number()?,
            Placeholder::Month => self.month = number()?,
            Placeholder::Day => self.day = number()?,
            Placeholder::Hour => self.hour = number()?,
            Placeholder::Minute => self.minute = number()?,
            Placeholder::Second => self.second = number()?,
            Placeholder::Microsecond => self.microsecond = number()?,
            Placeholder::Zone => self.zone = Some(value),
            Placeholder::UnixSeconds => self.unix_seconds = number()?,
        }
        Some(())
    }

    /// Builds the start timestamp. A positive Unix timestamp wins over every
    /// calendar component.
    fn start(&self, fallback: Option<UtcOffset>) -> Option<OffsetDateTime> {
        if self.unix_seconds > 0 {
            let nanos = i128::from(self.unix_seconds) * 1_000_000_000 + i128::from(self.microsecond) * 1_000;
            let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
            let offset = fallback.unwrap_or_else(|| local_offset_at(utc));
            return utc.checked_to_offset(offset);
        }
        let wall = self.wall_clock()?;
        let Some(zone) = self.zone else {
            let offset = fallback.unwrap_or_else(|| local_offset_at(wall.assume_utc()));
            return Some(wall.assume_offset(offset));
        };
        let seconds = zone_seconds(zone)
            .inspect_err(|err| trace!(zone, error = %**err, "captured zone is malformed"))
            .ok()?;
        match UtcOffset::from_whole_seconds(seconds) {
            Ok(offset) => Some(wall.assume_offset(offset)),
            Err(_) => {
                // Beyond any UtcOffset: keep the instant, expressed in UTC.
                trace!(zone, seconds, "captured zone cannot be represented, decoding in UTC");
                wall.assume_utc().checked_sub(Duration::seconds(i64::from(seconds)))
            },
        }
    }

    /// Assembles the calendar components, carrying overflow the way calendar
    /// arithmetic does: month 13 is January of the next year, day 0 is the
    /// last day of the previous month, hour 24 is midnight of the next day.
    /// Carrying past year 9999 is out of [`Date`]'s range and fails.
    fn wall_clock(&self) -> Option<PrimitiveDateTime> {
        let months = self.year * 12 + (self.month - 1);
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = Month::try_from(u8::try_from(months.rem_euclid(12) + 1).ok()?).ok()?;
        let first = Date::from_calendar_date(year, month, 1).ok()?;
        let elapsed = Duration::days(self.day - 1)
            + Duration::hours(self.hour)
            + Duration::minutes(self.minute)
            + Duration::seconds(self.second)
            + Duration::microseconds(self.microsecond);
        PrimitiveDateTime::new(first, Time::MIDNIGHT).checked_add(elapsed)
    }
}

fn local_offset_at(datetime: OffsetDateTime) -> UtcOffset {
    UtcOffset::local_offset_at(datetime).unwrap_or_else(|_| {
        debug!("local offset is indeterminate, assuming UTC");
        UtcOffset::UTC
    })
}
