// src/instrument/bulk.rs

use super::{Instrument, SampleHandler};
use crate::common::{
    crc::{verify_payload_crc, WIRE_CRC_LEN},
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
};
use crate::dataset::Dataset;
use core::fmt::Debug;

/// Largest chunk a single `readdata` may request.
pub const MAX_READ_DATA_LEN: usize = 1800;

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Downloads up to `out.len()` bytes of `dataset` starting at `offset`.
    ///
    /// The instrument answers with a text header giving the size it is actually sending (less
    /// than requested at the end of the dataset), then the raw bytes, then a CRC-16.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` with the number of bytes written to the front of `out`.
    /// * `Err(RbrError::InvalidParameter)` for an empty request or one over
    ///   [`MAX_READ_DATA_LEN`].
    /// * `Err(RbrError::ChecksumMismatch)` if the payload does not match its CRC. The data in
    ///   `out` must not be used and no message is available afterwards.
    pub fn read_data(
        &mut self,
        dataset: Dataset,
        offset: u32,
        out: &mut [u8],
    ) -> Result<usize, RbrError<IF::Error>> {
        if out.is_empty() || out.len() > MAX_READ_DATA_LEN {
            return Err(RbrError::InvalidParameter("read size out of range"));
        }

        self.converse(format_args!(
            "readdata dataset = {}, size = {}, offset = {}",
            dataset,
            out.len(),
            offset
        ))?;
        let size = self.required("size")?;
        let size: usize = Self::value(&size)?;
        if size > out.len() {
            return Err(RbrError::InvalidFormat);
        }

        let payload = &mut out[..size];
        self.read_exact(payload)?;
        let mut crc_bytes = [0u8; WIRE_CRC_LEN];
        self.read_exact(&mut crc_bytes)?;

        if let Err(e) = verify_payload_crc::<IF::Error>(payload, crc_bytes) {
            self.message_available = false;
            log::warn!("readdata of {} bytes at offset {} failed its CRC", size, offset);
            return Err(e);
        }

        log::trace!("readdata: {} bytes from dataset {} at offset {}", size, dataset, offset);
        Ok(size)
    }
}
