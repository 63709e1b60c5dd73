// src/common/timestamp.rs

//! Conversions between the instrument's textual timestamps and milliseconds since the Unix epoch.
//!
//! Two wire formats exist: `YYYY-MM-DD hh:mm:ss.sss` leads every streamed sample, and
//! `YYYYMMDDhhmmss` is used by `clock datetime`. Both are UTC.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use core::fmt;

/// Length of a sample timestamp, `YYYY-MM-DD hh:mm:ss.sss`.
pub const SAMPLE_TIMESTAMP_LEN: usize = 23;

/// Length of a clock timestamp, `YYYYMMDDhhmmss`.
pub const CLOCK_TIMESTAMP_LEN: usize = 14;

fn digits(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    s.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

fn to_epoch_ms(
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    let datetime = date.and_hms_milli_opt(hour, minute, second, milli)?;
    Some(datetime.and_utc().timestamp_millis())
}

/// Parses `YYYY-MM-DD hh:mm:ss.sss` into milliseconds since the epoch.
pub fn parse_sample_timestamp(s: &str) -> Option<i64> {
    let b = s.as_bytes();
    if b.len() != SAMPLE_TIMESTAMP_LEN
        || b[4] != b'-'
        || b[7] != b'-'
        || b[10] != b' '
        || b[13] != b':'
        || b[16] != b':'
        || b[19] != b'.'
    {
        return None;
    }
    to_epoch_ms(
        digits(&b[0..4])?,
        digits(&b[5..7])?,
        digits(&b[8..10])?,
        digits(&b[11..13])?,
        digits(&b[14..16])?,
        digits(&b[17..19])?,
        digits(&b[20..23])?,
    )
}

/// Parses `YYYYMMDDhhmmss` into milliseconds since the epoch.
pub fn parse_clock_timestamp(s: &str) -> Option<i64> {
    let b = s.as_bytes();
    if b.len() != CLOCK_TIMESTAMP_LEN {
        return None;
    }
    to_epoch_ms(
        digits(&b[0..4])?,
        digits(&b[4..6])?,
        digits(&b[6..8])?,
        digits(&b[8..10])?,
        digits(&b[10..12])?,
        digits(&b[12..14])?,
        0,
    )
}

/// Renders milliseconds since the epoch as `YYYYMMDDhhmmss`, dropping the sub-second part.
///
/// Returns `None` for timestamps outside the representable range or before year 0.
pub fn clock_timestamp(epoch_ms: i64) -> Option<ClockTimestamp> {
    let datetime = DateTime::from_timestamp_millis(epoch_ms)?;
    if datetime.year() < 0 || datetime.year() > 9999 {
        return None;
    }
    Some(ClockTimestamp(epoch_ms, datetime.naive_utc()))
}

/// Displayable `YYYYMMDDhhmmss` form of a timestamp, produced by [`clock_timestamp`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClockTimestamp(i64, chrono::NaiveDateTime);

impl ClockTimestamp {
    pub fn epoch_ms(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.1;
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            t.year(),
            t.month(),
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_timestamp() {
        assert_eq!(parse_sample_timestamp("1970-01-01 00:00:00.000"), Some(0));
        assert_eq!(
            parse_sample_timestamp("2019-02-07 18:36:24.250"),
            Some(1_549_564_584_250)
        );
        assert_eq!(parse_sample_timestamp("2019-02-07 18:36:24"), None);
        assert_eq!(parse_sample_timestamp("2019-02-07T18:36:24.250"), None);
        assert_eq!(parse_sample_timestamp("2019-13-07 18:36:24.250"), None);
        assert_eq!(parse_sample_timestamp("2019-02-07 18:3a:24.250"), None);
    }

    #[test]
    fn test_clock_timestamp() {
        assert_eq!(parse_clock_timestamp("20190207183624"), Some(1_549_564_584_000));
        assert_eq!(parse_clock_timestamp("2019020718362"), None);
        assert_eq!(parse_clock_timestamp("20190230183624"), None);

        let rendered = clock_timestamp(1_549_564_584_250).unwrap();
        assert_eq!(rendered.to_string(), "20190207183624");
        assert_eq!(rendered.epoch_ms(), 1_549_564_584_250);
    }
}
