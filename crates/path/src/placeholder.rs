//! The closed placeholder vocabulary and the tokenizer shared by the encoder
//! and decoder.
//!
//! A format string is read left-to-right as a sequence of [`Token`]s: runs of
//! literal text and recognized placeholders. A `%` that doesn't introduce a
//! recognized placeholder is plain literal text.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A substitutable field in a path format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `%path`, the logical path the segment was recorded for.
    Path,
    /// `%ship_name`, the identifier label of the recording source.
    ShipName,
    /// `%Y`, four-digit year.
    Year,
    /// `%m`, two-digit month.
    Month,
    /// `%d`, two-digit day of the month.
    Day,
    /// `%H`, two-digit hour.
    Hour,
    /// `%M`, two-digit minute.
    Minute,
    /// `%S`, two-digit second.
    Second,
    /// `%f`, six-digit microsecond.
    Microsecond,
    /// `%z`, UTC offset as `Z` or `±HHMM`.
    Zone,
    /// `%s`, ten-digit Unix timestamp in seconds.
    UnixSeconds,
}

impl Placeholder {
    /// Every placeholder, ordered so that a longer token is always tried
    /// before any token it starts with (`%ship_name` before `%s`).
    pub const ALL: [Placeholder; 11] = [
        Placeholder::Path,
        Placeholder::ShipName,
        Placeholder::Year,
        Placeholder::Month,
        Placeholder::Day,
        Placeholder::Hour,
        Placeholder::Minute,
        Placeholder::Second,
        Placeholder::Microsecond,
        Placeholder::Zone,
        Placeholder::UnixSeconds,
    ];

    /// Returns the token as written in a format string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::Path => "%path",
            Placeholder::ShipName => "%ship_name",
            Placeholder::Year => "%Y",
            Placeholder::Month => "%m",
            Placeholder::Day => "%d",
            Placeholder::Hour => "%H",
            Placeholder::Minute => "%M",
            Placeholder::Second => "%S",
            Placeholder::Microsecond => "%f",
            Placeholder::Zone => "%z",
            Placeholder::UnixSeconds => "%s",
        }
    }

    /// Returns the capturing sub-pattern this placeholder compiles to.
    ///
    /// Each pattern contains exactly one capture group.
    pub(crate) fn pattern(&self) -> &'static str {
        match self {
            Placeholder::Path | Placeholder::ShipName => "(.*?)",
            Placeholder::Year => "([0-9]{4})",
            Placeholder::Month
            | Placeholder::Day
            | Placeholder::Hour
            | Placeholder::Minute
            | Placeholder::Second => "([0-9]{2})",
            Placeholder::Microsecond => "([0-9]{6})",
            Placeholder::Zone => r"(Z|\+[0-9]{4}|-[0-9]{4})",
            Placeholder::UnixSeconds => "([0-9]{10})",
        }
    }

    /// Returns the placeholder that `s` starts with, if any.
    fn match_prefix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| s.starts_with(p.as_str()))
    }
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A piece of a tokenized format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text, copied verbatim.
    Literal(&'a str),
    /// A recognized placeholder.
    Placeholder(Placeholder),
}

/// Iterator over the [`Token`]s of a format string. See [`tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        if let Some(placeholder) = Placeholder::match_prefix(self.rest) {
            self.rest = &self.rest[placeholder.as_str().len()..];
            return Some(Token::Placeholder(placeholder));
        }
        // The literal runs up to the next `%` that starts a placeholder.
        let end = self
            .rest
            .match_indices('%')
            .map(|(i, _)| i)
            .find(|&i| i > 0 && Placeholder::match_prefix(&self.rest[i..]).is_some())
            .unwrap_or(self.rest.len());
        let (literal, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Token::Literal(literal))
    }
}

/// Splits a format string into literal runs and placeholders, left-to-right.
///
/// ```
/// use recstore_path::{Placeholder, Token, tokenize};
///
/// let tokens: Vec<_> = tokenize("%path/%Y.mp4").collect();
/// assert_eq!(tokens, [
///     Token::Placeholder(Placeholder::Path),
///     Token::Literal("/"),
///     Token::Placeholder(Placeholder::Year),
///     Token::Literal(".mp4"),
/// ]);
/// ```
pub fn tokenize(format: &str) -> Tokens<'_> {
    Tokens { rest: format }
}

/// Returns the placeholder occurrence sequence of a format string: every
/// placeholder in the order it appears, duplicates included.
pub fn placeholders(format: &str) -> Vec<Placeholder> {
    tokenize(format)
        .filter_map(|token| match token {
            Token::Placeholder(p) => Some(p),
            Token::Literal(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("%path", Placeholder::Path)]
    #[case("%ship_name", Placeholder::ShipName)]
    #[case("%Y", Placeholder::Year)]
    #[case("%m", Placeholder::Month)]
    #[case("%d", Placeholder::Day)]
    #[case("%H", Placeholder::Hour)]
    #[case("%M", Placeholder::Minute)]
    #[case("%S", Placeholder::Second)]
    #[case("%f", Placeholder::Microsecond)]
    #[case("%z", Placeholder::Zone)]
    #[case("%s", Placeholder::UnixSeconds)]
    fn test_single_placeholder(#[case] format: &str, #[case] expected: Placeholder) {
        assert_eq!(tokenize(format).collect::<Vec<_>>(), [Token::Placeholder(expected)]);
        assert_eq!(expected.to_string(), format);
    }

    #[test]
    fn test_ship_name_is_not_unix_seconds() {
        assert_eq!(placeholders("%ship_name"), [Placeholder::ShipName]);
        assert_eq!(placeholders("%s_%ship_name"), [Placeholder::UnixSeconds, Placeholder::ShipName]);
        // Only the exact token counts, the rest is literal.
        assert_eq!(
            tokenize("%ship").collect::<Vec<_>>(),
            [Token::Placeholder(Placeholder::UnixSeconds), Token::Literal("hip")]
        );
    }

    #[test]
    fn test_unknown_percent_is_literal() {
        assert_eq!(tokenize("100%").collect::<Vec<_>>(), [Token::Literal("100%")]);
        assert_eq!(
            tokenize("%q%Y%").collect::<Vec<_>>(),
            [Token::Literal("%q"), Token::Placeholder(Placeholder::Year), Token::Literal("%")]
        );
        assert_eq!(tokenize("%%Y").collect::<Vec<_>>(), [
            Token::Literal("%"),
            Token::Placeholder(Placeholder::Year)
        ]);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(placeholders("%m/%M"), [Placeholder::Month, Placeholder::Minute]);
        assert_eq!(placeholders("%y%PATH"), []);
    }

    #[test]
    fn test_occurrence_sequence_keeps_duplicates() {
        assert_eq!(
            placeholders("%Y/%m/%Y-%path.mp4"),
            [Placeholder::Year, Placeholder::Month, Placeholder::Year, Placeholder::Path]
        );
    }

    #[test]
    fn test_empty_format() {
        assert_eq!(tokenize("").count(), 0);
        assert!(placeholders("plain/file.mp4").is_empty());
    }
}
