//! Listing, lookup and pruning of recorded segments on the local filesystem,
//! driven by a [`recstore_path`] format string.

pub mod error;
mod local;
mod models;
mod path;

pub use crate::local::{LocalSegments, SegmentStream};
pub use crate::models::Segment;
pub use crate::path::validate as validate_path_name;
