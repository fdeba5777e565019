/// Renders `value` in decimal, left-padded with zeros to at least `width`
/// characters.
///
/// Values that are already `width` characters or longer are returned as-is,
/// never truncated.
///
/// ```
/// use recstore_path::leading_zeros;
///
/// assert_eq!(leading_zeros(5, 2), "05");
/// assert_eq!(leading_zeros(123, 2), "123");
/// ```
#[must_use]
pub fn leading_zeros(value: i64, width: usize) -> String {
    let out = value.to_string();
    if out.len() >= width {
        return out;
    }
    format!("{}{out}", "0".repeat(width - out.len()))
}
