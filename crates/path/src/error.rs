//! Path Codec Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Decoding a candidate path is *not* fallible in this sense: a path that
//! doesn't conform to a format is reported as `None`. These errors cover the
//! pieces that can genuinely go wrong, like compiling a format or decoding a
//! zone string that came from somewhere other than the decoder itself.

use derive_more::{Display, Error};

/// A path codec error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for path codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The format string could not be compiled into a matching pattern.
    #[display("cannot compile path format: {_0}")]
    Pattern(#[error(not(source))] String),
    /// A substituted value would itself introduce placeholders.
    #[display("substituted value contains placeholders: {_0}")]
    Substitution(#[error(not(source))] String),
    /// A zone string was not `Z` or a signed four-digit offset.
    #[display("malformed zone: {_0}")]
    MalformedZone(#[error(not(source))] String),
    /// A zone string decoded to an offset outside the representable range.
    #[display("zone offset out of range: {_0} seconds")]
    ZoneOutOfRange(#[error(not(source))] i32),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Everything here is a pure function of its input.
        false
    }
}
