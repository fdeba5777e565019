//! Segments stored on the local filesystem.
//!
//! Listing never enumerates the whole filesystem: the walk starts at the
//! format's common prefix, the deepest directory every segment path shares,
//! and every file below it is decoded against the format. Files that don't
//! decode aren't segments and are skipped silently. Directories and entries
//! below the start directory that cannot be read are logged and skipped, so
//! one bad subdirectory never hides the rest of the recordings.

use crate::error::{ErrorKind, Result};
use crate::models::Segment;
use crate::path::validate as validate_path_name;
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, TryStreamExt};
use recstore_path::{PathFormat, Placeholder, RecordFormat, SegmentPath, add_extension};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use time::{OffsetDateTime, UtcOffset};
use tokio::fs::{self, DirEntry, ReadDir};
use tracing::{instrument, warn};

pub type SegmentStream<'a> = Pin<Box<dyn Stream<Item = Result<Segment>> + Send + 'a>>;

enum WalkEntry {
    Segment(Segment),
    Descend(PathBuf),
    Skip,
}

/// Recorded segments of one configured format, on the local filesystem.
///
/// The format is compiled once, with the record format's extension appended,
/// and reused for every file. Paths are used as the format produces them, so
/// a relative format is relative to the current working directory.
///
/// # Examples
///
/// ```no_run
/// use recstore_path::RecordFormat;
/// use recstore_storage::LocalSegments;
///
/// # async fn example() -> recstore_storage::error::Result<()> {
/// let segments = LocalSegments::new("/srv/recordings/%path/%Y-%m-%d_%H-%M-%S-%f", RecordFormat::Fmp4)?;
/// for segment in segments.find("cam1").await? {
///     println!("{} starts at {}", segment.file.display(), segment.start());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalSegments {
    format: PathFormat,
    record_format: RecordFormat,
}

impl LocalSegments {
    /// Compiles `format` (without extension) for segments of `record_format`.
    pub fn new(format: &str, record_format: RecordFormat) -> Result<Self> {
        let compiled = PathFormat::new(add_extension(format, record_format))
            .or_raise(|| ErrorKind::Format(format.to_string()))?;
        Ok(Self {
            format: compiled,
            record_format,
        })
    }

    /// See [`PathFormat::with_fallback_offset`].
    pub fn with_fallback_offset(mut self, offset: impl Into<Option<UtcOffset>>) -> Self {
        self.format = self.format.with_fallback_offset(offset);
        self
    }

    /// The compiled format, extension included.
    pub fn format(&self) -> &PathFormat {
        &self.format
    }

    pub fn record_format(&self) -> RecordFormat {
        self.record_format
    }

    /// File path a segment with this metadata is recorded to.
    pub fn segment_path(&self, record: &SegmentPath) -> PathBuf {
        PathBuf::from(self.format.encode(record))
    }

    /// Streams every segment of the format, in no particular order.
    ///
    /// A start directory that doesn't exist yet lists as empty, one that
    /// cannot be read yields an error. Anything unreadable below it is logged
    /// and skipped.
    pub fn list_stream(&self) -> SegmentStream<'_> {
        walk(&self.format)
    }

    /// Collects [`list_stream`](Self::list_stream), failing on the first error.
    #[instrument(skip(self), fields(format = %self.format))]
    pub async fn list(&self) -> Result<Vec<Segment>> {
        self.list_stream().try_collect().await
    }

    /// Lists the segments recorded for one path name, oldest first.
    ///
    /// The name is substituted into the format before walking, so only the
    /// directories that can hold its segments are visited.
    #[instrument(skip(self), fields(format = %self.format))]
    pub async fn find(&self, path_name: &str) -> Result<Vec<Segment>> {
        if !self.format.contains(Placeholder::Path) {
            exn::bail!(ErrorKind::Format(format!("{} has no {}", self.format, Placeholder::Path)));
        }
        let name = validate_path_name(path_name)?;
        let narrowed = self
            .format
            .substitute(Placeholder::Path, &name)
            .or_raise(|| ErrorKind::InvalidPath(name.clone()))?;
        let mut segments: Vec<Segment> = walk(&narrowed).try_collect().await?;
        for segment in &mut segments {
            segment.record.path.clone_from(&name);
        }
        segments.sort_by_key(Segment::start);
        Ok(segments)
    }

    /// Deletes every segment that started before `cutoff`, returning how many
    /// were deleted.
    ///
    /// A segment that cannot be deleted is logged and skipped.
    #[instrument(skip(self), fields(format = %self.format))]
    pub async fn prune(&self, cutoff: OffsetDateTime) -> Result<usize> {
        let mut deleted = 0;
        for segment in self.list().await?.iter().filter(|s| s.start() < cutoff) {
            match self.delete(segment).await {
                Ok(()) => deleted += 1,
                Err(err) => warn!(file = %segment.file.display(), error = %*err, "cannot delete segment"),
            }
        }
        Ok(deleted)
    }

    /// Deletes one segment, then any directories it leaves empty below the
    /// format's common prefix.
    pub async fn delete(&self, segment: &Segment) -> Result<()> {
        fs::remove_file(&segment.file).await.map_err(|e| map_io_error(e, &segment.file))?;
        tracing::info!(file = %segment.file.display(), start = ?segment.start(), "deleted segment");
        remove_empty_parents(&segment.file, &start_dir(&self.format)).await;
        Ok(())
    }
}

/// The directory a walk over `format` starts from.
fn start_dir(format: &PathFormat) -> PathBuf {
    let prefix = format.common_prefix();
    // An absolute format with a placeholder straight after the root.
    if prefix.is_empty() && format.as_str().starts_with(['/', '\\']) {
        return PathBuf::from(&format.as_str()[..1]);
    }
    PathBuf::from(prefix)
}

fn walk(format: &PathFormat) -> SegmentStream<'_> {
    let root = start_dir(format);
    let mut stack = vec![root.clone()];
    Box::pin(stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match open_dir(&current).await {
                Ok(Some(entries)) => entries,
                Ok(None) => continue 'dirs,
                // Only an unreadable start directory fails the walk.
                Err(err) if current == root => {
                    yield Err(err);
                    continue 'dirs;
                },
                Err(err) => {
                    warn!(dir = %current.display(), error = %*err, "skipping unreadable directory");
                    continue 'dirs;
                },
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(err) => {
                        warn!(dir = %current.display(), error = %err, "cannot read further directory entries");
                        break 'entries;
                    },
                };
                match process_entry(format, &current, entry).await {
                    Ok(WalkEntry::Segment(segment)) => yield Ok(segment),
                    Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(err) => warn!(dir = %current.display(), error = %*err, "skipping unreadable entry"),
                };
            }
        }
    })
}

/// Opens `dir` for listing; `None` if it doesn't exist.
async fn open_dir(dir: &Path) -> Result<Option<ReadDir>> {
    // An empty start directory means the format is relative with no literal
    // prefix; candidates must stay relative too.
    let readable = match dir.as_os_str().is_empty() {
        true => Path::new("."),
        false => dir,
    };
    match fs::read_dir(readable).await {
        Ok(entries) => Ok(Some(entries)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(exn::Exn::from(map_io_error(err, dir))),
    }
}

async fn process_entry(format: &PathFormat, dir: &Path, entry: DirEntry) -> Result<WalkEntry> {
    let path = dir.join(entry.file_name());
    let file_type = entry.file_type().await.map_err(|e| map_io_error(e, &path))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    let Some(record) = path.to_str().and_then(|candidate| format.decode(candidate)) else {
        return Ok(WalkEntry::Skip);
    };
    // Symlinks are followed to their target, but never descended into.
    let metadata = match file_type.is_symlink() {
        true => fs::metadata(&path).await,
        false => entry.metadata().await,
    }
    .map_err(|e| map_io_error(e, &path))?;
    if !metadata.is_file() {
        return Ok(WalkEntry::Skip);
    }
    Ok(WalkEntry::Segment(segment(path, &metadata, record)?))
}

fn segment(path: PathBuf, metadata: &Metadata, record: SegmentPath) -> Result<Segment> {
    let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
    Ok(Segment::new(path, metadata.len(), modified, record))
}

/// Removes `file`'s parent directories while they are empty, stopping at
/// `root`.
async fn remove_empty_parents(file: &Path, root: &Path) {
    let mut current = file.parent();
    while let Some(dir) = current {
        if dir == root || dir.as_os_str().is_empty() || !dir.starts_with(root) {
            break;
        }
        // Fails on the first directory that still has entries.
        if fs::remove_dir(dir).await.is_err() {
            break;
        }
        tracing::debug!(dir = %dir.display(), "removed empty directory");
        current = dir.parent();
    }
}

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"data").unwrap();
    }

    fn store(root: &Path, record_format: RecordFormat) -> LocalSegments {
        let format = format!("{}/%path/%Y-%m-%d_%H-%M-%S-%f", root.display());
        LocalSegments::new(&format, record_format)
            .unwrap()
            .with_fallback_offset(UtcOffset::UTC)
    }

    fn populate(root: &Path) {
        touch(&root.join("cam1/2024-01-01_00-00-00-000000.mp4"));
        touch(&root.join("cam1/2024-01-01_01-00-00-000000.mp4"));
        touch(&root.join("site/cam2/2024-01-02_00-00-00-000000.mp4"));
        // Not segments of the fMP4 format.
        touch(&root.join("cam1/notes.txt"));
        touch(&root.join("cam1/2024-01-01_02-00-00-000000.ts"));
    }

    #[test]
    fn test_start_dir() {
        let format = |f: &str| PathFormat::new(f).unwrap();
        assert_eq!(start_dir(&format("/srv/rec/%path/%s")), Path::new("/srv/rec"));
        assert_eq!(start_dir(&format("%path/%s")), Path::new(""));
        assert_eq!(start_dir(&format("/%path/%s")), Path::new("/"));
    }

    #[tokio::test]
    async fn test_list() {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path());
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);

        let mut found = segments.list().await.unwrap();
        found.sort_by_key(Segment::start);
        let paths: Vec<&str> = found.iter().map(|s| s.record.path.as_str()).collect();
        assert_eq!(paths, ["cam1", "cam1", "site/cam2"]);
        assert_eq!(found[0].start(), datetime!(2024-01-01 00:00 UTC));
        assert_eq!(found[0].file, temp_dir.path().join("cam1/2024-01-01_00-00-00-000000.mp4"));
        assert_eq!(found[0].size, 4);
    }

    #[tokio::test]
    async fn test_list_mpegts() {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path());
        let segments = store(temp_dir.path(), RecordFormat::MpegTs);

        let found = segments.list().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start(), datetime!(2024-01-01 02:00 UTC));
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let segments = store(&temp_dir.path().join("not-yet-created"), RecordFormat::Fmp4);
        assert!(segments.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_start_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let not_a_dir = temp_dir.path().join("recordings");
        std::fs::write(&not_a_dir, b"").unwrap();
        let err = store(&not_a_dir, RecordFormat::Fmp4).list().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_entries_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path());
        let dangling = temp_dir.path().join("cam1/2024-01-01_03-00-00-000000.mp4");
        std::os::unix::fs::symlink(temp_dir.path().join("gone.mp4"), &dangling).unwrap();
        let linked = temp_dir.path().join("cam3/2024-01-01_04-00-00-000000.mp4");
        std::fs::create_dir_all(linked.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("cam1/notes.txt"), &linked).unwrap();
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);

        let found = segments.list().await.unwrap();
        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|s| s.file != dangling));
        assert!(found.iter().any(|s| s.file == linked));

        // Pruning still reaches every readable segment.
        assert_eq!(segments.prune(datetime!(2024-01-01 02:00 UTC)).await.unwrap(), 2);
        assert!(dangling.symlink_metadata().is_ok());
    }

    #[tokio::test]
    async fn test_find() {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path());
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);

        let cam1 = segments.find("cam1").await.unwrap();
        assert_eq!(cam1.len(), 2);
        assert!(cam1.iter().all(|s| s.record.path == "cam1"));
        assert!(cam1[0].start() < cam1[1].start());

        let cam2 = segments.find("site//cam2/").await.unwrap();
        assert_eq!(cam2.len(), 1);
        assert_eq!(cam2[0].record.path, "site/cam2");

        assert!(segments.find("cam").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_rejects_bad_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);
        let err = segments.find("../elsewhere").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
        let err = segments.find("%Y").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_find_requires_path_placeholder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let format = format!("{}/%s", temp_dir.path().display());
        let segments = LocalSegments::new(&format, RecordFormat::Fmp4).unwrap();
        let err = segments.find("cam1").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Format(_)));
    }

    #[tokio::test]
    async fn test_segment_path_is_listed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);
        let record = SegmentPath::new(datetime!(2024-05-06 07:08:09.101112 UTC)).with_path("deck/bow");

        let file = segments.segment_path(&record);
        assert_eq!(file, temp_dir.path().join("deck/bow/2024-05-06_07-08-09-101112.mp4"));
        touch(&file);

        let found = segments.find("deck/bow").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record, record);
    }

    #[tokio::test]
    async fn test_prune() {
        let temp_dir = tempfile::tempdir().unwrap();
        populate(temp_dir.path());
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);

        assert_eq!(segments.prune(datetime!(2024-01-01 00:30 UTC)).await.unwrap(), 1);
        assert_eq!(segments.list().await.unwrap().len(), 2);
        assert!(!temp_dir.path().join("cam1/2024-01-01_00-00-00-000000.mp4").exists());

        assert_eq!(segments.prune(datetime!(2024-01-03 00:00 UTC)).await.unwrap(), 2);
        assert!(segments.list().await.unwrap().is_empty());
        // Emptied directories are removed, the root and non-empty ones stay.
        assert!(!temp_dir.path().join("site").exists());
        assert!(temp_dir.path().join("cam1/notes.txt").exists());
        assert!(temp_dir.path().exists());
    }

    #[tokio::test]
    async fn test_delete_missing_segment() {
        let temp_dir = tempfile::tempdir().unwrap();
        let segments = store(temp_dir.path(), RecordFormat::Fmp4);
        let record = SegmentPath::new(datetime!(2024-01-01 00:00 UTC)).with_path("cam1");
        let segment = Segment::new(segments.segment_path(&record), 0, OffsetDateTime::UNIX_EPOCH, record);
        let err = segments.delete(&segment).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
