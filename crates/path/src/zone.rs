//! Compact textual form of UTC offsets, as used by the `%z` placeholder.
//!
//! An offset of zero is written `Z`, anything else as a sign followed by
//! two-digit hours and two-digit minutes (`+0530`, `-0800`).
//!
//! Decoding multiplies the minutes by 3600, not 60, and must keep doing so for
//! existing recordings to decode to the same instants. Whole-hour offsets are
//! unaffected; anything else decodes to `hours + minutes` hours. Offsets that
//! end up beyond what [`UtcOffset`] can hold (26 hours or more) are an error
//! for [`decode_zone`]. Path decoding still places such paths at the instant
//! the offset describes, expressed in UTC.

use crate::error::{ErrorKind, Result};
use crate::util::leading_zeros;
use exn::{OptionExt, ResultExt};
use time::UtcOffset;

/// Encodes an offset as `Z` or `±HHMM`.
///
/// Seconds beyond whole minutes are dropped.
///
/// ```
/// use recstore_path::encode_zone;
/// use time::UtcOffset;
///
/// assert_eq!(encode_zone(UtcOffset::UTC), "Z");
/// assert_eq!(encode_zone(UtcOffset::from_hms(5, 30, 0).unwrap()), "+0530");
/// assert_eq!(encode_zone(UtcOffset::from_hms(-8, 0, 0).unwrap()), "-0800");
/// ```
#[must_use]
pub fn encode_zone(offset: UtcOffset) -> String {
    let seconds = offset.whole_seconds();
    if seconds == 0 {
        return "Z".to_string();
    }
    let sign = if seconds > 0 { '+' } else { '-' };
    let magnitude = i64::from(seconds).abs();
    format!(
        "{sign}{}{}",
        leading_zeros(magnitude / 3600, 2),
        leading_zeros((magnitude / 60) % 60, 2)
    )
}

/// Decodes `Z` or `±HHMM` into an offset of sign × (HH×3600 + MM×3600)
/// seconds.
///
/// ```
/// use recstore_path::decode_zone;
/// use time::UtcOffset;
///
/// assert_eq!(decode_zone("Z").unwrap(), UtcOffset::UTC);
/// assert_eq!(decode_zone("-0800").unwrap(), UtcOffset::from_hms(-8, 0, 0).unwrap());
/// // Minutes count as hours.
/// assert_eq!(decode_zone("+0002").unwrap(), UtcOffset::from_hms(2, 0, 0).unwrap());
/// ```
pub fn decode_zone(s: &str) -> Result<UtcOffset> {
    let seconds = zone_seconds(s)?;
    UtcOffset::from_whole_seconds(seconds).or_raise(|| ErrorKind::ZoneOutOfRange(seconds))
}

/// Decodes `Z` or `±HHMM` into signed offset seconds, without requiring the
/// result to fit a [`UtcOffset`].
pub(crate) fn zone_seconds(s: &str) -> Result<i32> {
    if s == "Z" {
        return Ok(0);
    }
    let malformed = || ErrorKind::MalformedZone(s.to_string());
    if s.len() != 5 {
        exn::bail!(malformed());
    }
    let sign = match s.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => exn::bail!(malformed()),
    };
    let hours: i32 = s.get(1..3).ok_or_raise(malformed)?.parse::<i32>().or_raise(malformed)?;
    let minutes: i32 = s.get(3..5).ok_or_raise(malformed)?.parse::<i32>().or_raise(malformed)?;
    Ok(sign * (hours * 3600 + minutes * 3600))
}
