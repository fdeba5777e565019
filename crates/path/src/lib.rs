//! Recording path templates.
//!
//! A recording's file path is generated from a user-configured format string
//! such as `%path/%Y-%m-%d_%H-%M-%S-%f`, and the same format string is used to
//! read the metadata back out of the paths found on disk. This crate provides
//! both directions:
//!
//! - **Encoding** a [`SegmentPath`] into a concrete path ([`SegmentPath::encode`],
//!   [`encode`]).
//! - **Decoding** a concrete path back into a [`SegmentPath`] ([`PathFormat::decode`],
//!   [`decode`]).
//! - **Scoping** directory scans to the literal part of a format ([`common_prefix`]).
//!
//! # Placeholders
//!
//! | Placeholder  | Encodes as                      | Decodes from             |
//! |--------------|---------------------------------|--------------------------|
//! | `%path`      | [`SegmentPath::path`]           | anything (shortest)      |
//! | `%ship_name` | [`SegmentPath::ship_name`]      | anything (shortest)      |
//! | `%Y`         | year                            | 4 digits                 |
//! | `%m`         | month, 2 digits                 | 2 digits                 |
//! | `%d`         | day, 2 digits                   | 2 digits                 |
//! | `%H`         | hour, 2 digits                  | 2 digits                 |
//! | `%M`         | minute, 2 digits                | 2 digits                 |
//! | `%S`         | second, 2 digits                | 2 digits                 |
//! | `%f`         | microsecond, 6 digits           | 6 digits                 |
//! | `%z`         | `Z` or `±HHMM` ([`encode_zone`]) | `Z` or `±` and 4 digits  |
//! | `%s`         | Unix seconds                    | 10 digits                |
//!
//! The set is closed. Any other `%` sequence is literal text, and there is no
//! way to escape a `%` that would otherwise start a placeholder.
//!
//! When a decoded path carries a positive `%s`, the start time comes from it
//! alone and every calendar placeholder is ignored.

pub mod error;
mod format;
mod placeholder;
mod prefix;
mod record_format;
mod segment;
mod util;
mod zone;

pub use crate::format::{PathFormat, decode};
pub use crate::placeholder::{Placeholder, Token, Tokens, placeholders, tokenize};
pub use crate::prefix::common_prefix;
pub use crate::record_format::{RecordFormat, add_extension};
pub use crate::segment::{SegmentPath, encode};
pub use crate::util::leading_zeros;
pub use crate::zone::{decode_zone, encode_zone};
