// src/common/sample.rs

use super::error::RbrError;
use super::reading::{flagged_reading, ReadingFlag};
use super::timestamp::{parse_sample_timestamp, SAMPLE_TIMESTAMP_LEN};

/// Maximum number of channel readings carried by a [`Sample`].
pub const MAX_CHANNELS: usize = 32;

/// A timestamped set of channel readings.
///
/// Readings beyond `channels` are always zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    channels: usize,
    readings: [f64; MAX_CHANNELS],
}

impl Default for Sample {
    fn default() -> Self {
        Sample {
            timestamp: 0,
            channels: 0,
            readings: [0.0; MAX_CHANNELS],
        }
    }
}

impl Sample {
    pub fn new(timestamp: i64) -> Self {
        Sample {
            timestamp,
            ..Sample::default()
        }
    }

    /// Builds a sample from at most [`MAX_CHANNELS`] readings; any beyond that are ignored.
    pub fn from_readings<I>(timestamp: i64, readings: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sample = Sample::new(timestamp);
        for (slot, reading) in sample.readings.iter_mut().zip(readings) {
            *slot = reading;
            sample.channels += 1;
        }
        sample
    }

    /// Number of channels with a reading.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The readings, in channel order.
    pub fn readings(&self) -> &[f64] {
        &self.readings[..self.channels]
    }

    /// Appends a reading.
    pub fn push(&mut self, reading: f64) -> Result<(), RbrError> {
        if self.channels == MAX_CHANNELS {
            return Err(RbrError::BufferOverflow {
                needed: MAX_CHANNELS + 1,
                got: MAX_CHANNELS,
            });
        }
        self.readings[self.channels] = reading;
        self.channels += 1;
        Ok(())
    }

    /// Drops all readings and resets the unused slots to zero.
    pub fn clear(&mut self) {
        self.timestamp = 0;
        self.channels = 0;
        self.readings = [0.0; MAX_CHANNELS];
    }
}

/// Separator between the timestamp and readings of a streamed sample.
const READING_SEPARATOR: &str = ", ";

/// Parses one reading as sent by the instrument.
///
/// `###` marks an uncalibrated channel and `E####` a channel error; both become flagged NaNs.
fn parse_reading(s: &str) -> Option<f64> {
    if s == "###" {
        return Some(flagged_reading(ReadingFlag::Uncalibrated, 0));
    }
    if let Some(code) = s.strip_prefix('E') {
        if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
            return code.parse::<u32>().ok().map(|code| flagged_reading(ReadingFlag::Error, code));
        }
        return None;
    }
    s.parse::<f64>().ok()
}

/// Recognises a streamed sample line, `YYYY-MM-DD hh:mm:ss.sss, r1, r2, ...`.
///
/// Anything that does not have exactly that shape, including lines with more than
/// [`MAX_CHANNELS`] readings, is not a sample and yields `None`.
pub fn parse_sample_line(line: &str) -> Option<Sample> {
    let timestamp = parse_sample_timestamp(line.get(..SAMPLE_TIMESTAMP_LEN)?)?;
    let mut sample = Sample::new(timestamp);

    let rest = &line[SAMPLE_TIMESTAMP_LEN..];
    if rest.is_empty() {
        return Some(sample);
    }
    let rest = rest.strip_prefix(READING_SEPARATOR)?;
    for field in rest.split(READING_SEPARATOR) {
        let reading = parse_reading(field.trim())?;
        sample.push(reading).ok()?;
    }
    Some(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::reading::{reading_error, reading_flag};

    #[test]
    fn test_from_readings_stops_at_max_channels() {
        let sample = Sample::from_readings(42, (0..40).map(f64::from));
        assert_eq!(sample.timestamp, 42);
        assert_eq!(sample.channels(), MAX_CHANNELS);
        assert_eq!(sample.readings()[MAX_CHANNELS - 1], 31.0);

        let short = Sample::from_readings(0, [1.5, 2.5]);
        assert_eq!(short.readings(), &[1.5, 2.5]);
        assert!(short.readings[2..].iter().all(|r| *r == 0.0));
    }

    #[test]
    fn test_parse_sample_line() {
        let sample = parse_sample_line("2019-02-07 18:36:24.250, 10.1234, -1.5, 0.0001").unwrap();
        assert_eq!(sample.timestamp, 1_549_564_584_250);
        assert_eq!(sample.readings(), &[10.1234, -1.5, 0.0001]);
        assert_eq!(sample.channels(), 3);
    }

    #[test]
    fn test_unused_slots_are_zero() {
        let sample = parse_sample_line("2019-02-07 18:36:24.250, 1.0").unwrap();
        assert!(sample.readings[1..].iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_flagged_readings() {
        let sample = parse_sample_line("2019-02-07 18:36:24.250, ###, E0501, 4.2").unwrap();
        let r = sample.readings();
        assert_eq!(reading_flag(r[0]), ReadingFlag::Uncalibrated);
        assert_eq!(reading_flag(r[1]), ReadingFlag::Error);
        assert_eq!(reading_error(r[1]), 501);
        assert_eq!(reading_flag(r[2]), ReadingFlag::None);
    }

    #[test]
    fn test_non_sample_lines() {
        assert!(parse_sample_line("id model = RBRduo3, version = 1.092").is_none());
        assert!(parse_sample_line("E0109 feature not available").is_none());
        assert!(parse_sample_line("2019-02-07 18:36:24.250, abc").is_none());
        assert!(parse_sample_line("2019-02-07 18:36:24.250,1.0").is_none());
        assert!(parse_sample_line("2019-02-07").is_none());
        assert!(parse_sample_line("").is_none());
    }

    #[test]
    fn test_too_many_readings_is_not_a_sample() {
        let mut line = std::string::String::from("2019-02-07 18:36:24.250");
        for _ in 0..=MAX_CHANNELS {
            line.push_str(", 1.0");
        }
        assert!(parse_sample_line(&line).is_none());
    }

    #[test]
    fn test_push_overflow() {
        let mut sample = Sample::new(0);
        for i in 0..MAX_CHANNELS {
            sample.push(i as f64).unwrap();
        }
        assert!(matches!(sample.push(0.0), Err(RbrError::BufferOverflow { .. })));
        sample.clear();
        assert_eq!(sample.channels(), 0);
    }
}
