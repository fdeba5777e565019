use crate::placeholder::{Placeholder, Token, tokenize};
use crate::util::leading_zeros;
use crate::zone::encode_zone;
use std::borrow::Cow;
use time::OffsetDateTime;

/// The metadata of one recorded segment, as carried by its file path.
///
/// Encoding against a format produces the segment's path; decoding a path
/// against the same format gives the record back (for every field the format
/// mentions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPath {
    /// Nominal start of the segment, in the offset it was recorded with.
    pub start: OffsetDateTime,
    /// Logical path the segment belongs to (`%path`).
    pub path: String,
    /// Identifier label of the recording source (`%ship_name`).
    pub ship_name: String,
}

impl SegmentPath {
    /// Creates a record starting at `start` with an empty path and label.
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            start,
            path: String::new(),
            ship_name: String::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_ship_name(mut self, ship_name: impl Into<String>) -> Self {
        self.ship_name = ship_name.into();
        self
    }

    /// Substitutes this record into every placeholder of `format`.
    ///
    /// Never fails: literal text (including any `%` that isn't a recognized
    /// placeholder) is copied as-is, and substituted values are never scanned
    /// for placeholders themselves.
    ///
    /// ```
    /// use recstore_path::SegmentPath;
    /// use time::macros::datetime;
    ///
    /// let segment = SegmentPath::new(datetime!(2024-03-07 09:05:02.000123 UTC)).with_ship_name("aurora");
    /// assert_eq!(
    ///     segment.encode("%Y-%m-%d/%ship_name/%H-%M-%S-%f%z.mp4"),
    ///     "2024-03-07/aurora/09-05-02-000123Z.mp4"
    /// );
    /// ```
    #[must_use]
    pub fn encode(&self, format: &str) -> String {
        let mut out = String::with_capacity(format.len() + self.path.len() + self.ship_name.len());
        for token in tokenize(format) {
            match token {
                Token::Literal(literal) => out.push_str(literal),
                Token::Placeholder(placeholder) => out.push_str(&self.field(placeholder)),
            }
        }
        out
    }

    fn field(&self, placeholder: Placeholder) -> Cow<'_, str> {
        let start = &self.start;
        match placeholder {
            Placeholder::Path => Cow::Borrowed(&self.path),
            Placeholder::ShipName => Cow::Borrowed(&self.ship_name),
            Placeholder::Year => Cow::Owned(start.year().to_string()),
            Placeholder::Month => Cow::Owned(leading_zeros(u8::from(start.month()).into(), 2)),
            Placeholder::Day => Cow::Owned(leading_zeros(start.day().into(), 2)),
            Placeholder::Hour => Cow::Owned(leading_zeros(start.hour().into(), 2)),
            Placeholder::Minute => Cow::Owned(leading_zeros(start.minute().into(), 2)),
            Placeholder::Second => Cow::Owned(leading_zeros(start.second().into(), 2)),
            Placeholder::Microsecond => Cow::Owned(leading_zeros(start.microsecond().into(), 6)),
            Placeholder::Zone => Cow::Owned(encode_zone(start.offset())),
            Placeholder::UnixSeconds => Cow::Owned(start.unix_timestamp().to_string()),
        }
    }
}

/// Encodes `record` against `format`. See [`SegmentPath::encode`].
#[must_use]
pub fn encode(record: &SegmentPath, format: &str) -> String {
    record.encode(format)
}
