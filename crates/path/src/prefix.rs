/// Returns the longest leading run of whole directory segments of `format`
/// that contain no placeholder, without its trailing separator.
///
/// Every path the format can produce starts with the returned string, so it
/// bounds a directory walk without listing placeholder-dependent directories.
/// Both `/` and `\` count as separators. The final segment (the file name) is
/// never part of the prefix, since it isn't followed by a separator.
///
/// ```
/// use recstore_path::common_prefix;
///
/// assert_eq!(common_prefix("/data/%Y/%m/cam.mp4"), "/data");
/// assert_eq!(common_prefix("%path/out.mp4"), "");
/// assert_eq!(common_prefix("/fixed/dir/file.mp4"), "/fixed/dir");
/// ```
#[must_use]
pub fn common_prefix(format: &str) -> &str {
    let mut end = 0;
    while let Some(i) = format[end..].find(['/', '\\']) {
        let segment = &format[end..=end + i];
        if segment.contains('%') {
            break;
        }
        end += i + 1;
    }
    match end {
        0 => "",
        // Separators are single bytes.
        _ => &format[..end - 1],
    }
}
