//! Storage models.

use recstore_path::SegmentPath;
use std::path::PathBuf;
use time::OffsetDateTime;

/// A recorded segment found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Path of the file, as reached by walking from the format's common prefix
    pub file: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Metadata decoded from the file path
    pub record: SegmentPath,
}
impl Segment {
    pub fn new(file: impl Into<PathBuf>, size: u64, modified: OffsetDateTime, record: SegmentPath) -> Self {
        Self {
            file: file.into(),
            size,
            modified,
            record,
        }
    }

    /// Nominal start of the segment.
    pub fn start(&self) -> OffsetDateTime {
        self.record.start
    }
}
