// src/common/reading.rs

//! Out-of-band conditions carried inside channel readings.
//!
//! A reading that is not a measurement is stored as a quiet NaN whose payload holds a flag and,
//! for channel errors, the instrument's error code:
//!
//! ```text
//!  63      51 50    40 39   32 31              0
//! [0 7FF 1   | 0 ...  | flag  | error code       ]
//! ```

/// Condition attached to a channel reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ReadingFlag {
    /// An ordinary measurement (or an untagged NaN).
    None = 0,
    /// The channel has no calibration; the instrument sent `###`.
    Uncalibrated = 1,
    /// The channel reported an error; the instrument sent `E####`.
    Error = 2,
}

impl ReadingFlag {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => ReadingFlag::Uncalibrated,
            2 => ReadingFlag::Error,
            _ => ReadingFlag::None,
        }
    }
}

const NAN_TAG: u64 = 0x7FF8_0000_0000_0000;
const TAG_MASK: u64 = 0xFFF8_0000_0000_0000;
const FLAG_SHIFT: u32 = 32;
const FLAG_MASK: u64 = 0xFF;
const CODE_MASK: u64 = 0xFFFF_FFFF;

#[inline]
fn tagged_bits(reading: f64) -> Option<u64> {
    let bits = reading.to_bits();
    (bits & TAG_MASK == NAN_TAG).then_some(bits)
}

/// Returns the flag stored in `reading`. Finite values and plain NaNs yield [`ReadingFlag::None`].
pub fn reading_flag(reading: f64) -> ReadingFlag {
    match tagged_bits(reading) {
        Some(bits) => ReadingFlag::from_bits(((bits >> FLAG_SHIFT) & FLAG_MASK) as u8),
        None => ReadingFlag::None,
    }
}

/// Returns the error code stored in `reading`, or 0 if it carries none.
pub fn reading_error(reading: f64) -> u32 {
    tagged_bits(reading).map_or(0, |bits| (bits & CODE_MASK) as u32)
}

/// Builds a NaN reading carrying `flag` and `code`.
pub fn flagged_reading(flag: ReadingFlag, code: u32) -> f64 {
    f64::from_bits(NAN_TAG | (u64::from(flag as u8) << FLAG_SHIFT) | u64::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_and_code_round_trip() {
        let codes = [0u32, 1, 109, 9999, 0x8000_0000, u32::MAX];
        for flag in [ReadingFlag::None, ReadingFlag::Uncalibrated, ReadingFlag::Error] {
            for code in codes {
                let reading = flagged_reading(flag, code);
                assert!(reading.is_nan());
                assert_eq!(reading_flag(reading), flag);
                assert_eq!(reading_error(reading), code);
            }
        }
    }

    #[test]
    fn test_ordinary_values_have_no_flag() {
        for x in [0.0, -0.0, 1.5, -273.15, 10.1325, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY] {
            assert_eq!(reading_flag(x), ReadingFlag::None);
            assert_eq!(reading_error(x), 0);
        }
        assert_eq!(reading_flag(f64::NAN), ReadingFlag::None);
        assert_eq!(reading_flag(-f64::NAN), ReadingFlag::None);
    }
}
