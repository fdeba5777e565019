use std::fmt::{Display, Formatter, Result as FmtResult};

/// Container format segments are recorded in.
///
/// Only decides the file extension appended to encoded paths. Defaults to
/// [`Fmp4`](Self::Fmp4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RecordFormat {
    /// Fragmented MP4 (.mp4)
    #[default]
    Fmp4,
    /// MPEG transport stream (.ts)
    MpegTs,
}

impl RecordFormat {
    /// Returns the file extension for this format, including the leading dot.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            RecordFormat::MpegTs => ".ts",
            RecordFormat::Fmp4 => ".mp4",
        }
    }

    /// Returns the short name used in configuration.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Fmp4 => "fmp4",
            RecordFormat::MpegTs => "mpegts",
        }
    }
}

impl Display for RecordFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Appends the extension of `format` to `path`.
///
/// Works equally on concrete paths and on format strings, which is how the
/// full pattern of a recording directory is built.
///
/// ```
/// use recstore_path::{RecordFormat, add_extension};
///
/// assert_eq!(add_extension("%path/%s", RecordFormat::MpegTs), "%path/%s.ts");
/// assert_eq!(add_extension("%path/%s", RecordFormat::Fmp4), "%path/%s.mp4");
/// ```
#[must_use]
pub fn add_extension(path: &str, format: RecordFormat) -> String {
    format!("{path}{}", format.extension())
}
