// src/dataset/easyparse.rs

use crate::common::sample::Sample;

/// Size of the timestamp leading each sample record.
pub const TIMESTAMP_LEN: usize = 8;

/// Size of one reading in a sample record.
pub const READING_LEN: usize = 4;

/// Size of one sample record for `channels` channels.
pub const fn sample_record_len(channels: usize) -> usize {
    TIMESTAMP_LEN + READING_LEN * channels
}

/// Decodes one sample record: a little-endian `u64` timestamp followed by one little-endian
/// `f32` per channel.
///
/// `record` must be exactly [`sample_record_len`]`(channels)` bytes and `channels` must not
/// exceed [`MAX_CHANNELS`](crate::common::sample::MAX_CHANNELS).
pub(super) fn decode_sample(record: &[u8], channels: usize) -> Sample {
    let mut timestamp = [0u8; TIMESTAMP_LEN];
    timestamp.copy_from_slice(&record[..TIMESTAMP_LEN]);
    let readings = record[TIMESTAMP_LEN..]
        .chunks_exact(READING_LEN)
        .take(channels)
        .map(|reading| {
            let mut bytes = [0u8; READING_LEN];
            bytes.copy_from_slice(reading);
            f64::from(f32::from_le_bytes(bytes))
        });
    Sample::from_readings(u64::from_le_bytes(timestamp) as i64, readings)
}
