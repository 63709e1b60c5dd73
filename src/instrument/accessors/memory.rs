// src/instrument/accessors/memory.rs

use core::fmt::Debug;

use crate::common::{
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
};
use crate::dataset::{Dataset, MemoryFormat};
use crate::instrument::{Instrument, SampleHandler};

/// Answer to `meminfo`, in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryInfo {
    pub used: u32,
    pub remaining: u32,
    pub size: u32,
}

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Memory used by `dataset`, and what is left.
    pub fn meminfo(&mut self, dataset: Dataset) -> Result<MemoryInfo, RbrError<IF::Error>> {
        self.converse(format_args!("meminfo dataset = {}", dataset))?;

        let mut used: Option<u32> = None;
        let mut remaining: Option<u32> = None;
        let mut size: Option<u32> = None;
        for p in self.parameters() {
            match p.key {
                "used" => used = Some(Self::value(&p)?),
                "remaining" => remaining = Some(Self::value(&p)?),
                "size" => size = Some(Self::value(&p)?),
                _ => {}
            }
        }

        match (used, remaining, size) {
            (Some(used), Some(remaining), Some(size)) => Ok(MemoryInfo {
                used,
                remaining,
                size,
            }),
            _ => Err(RbrError::InvalidFormat),
        }
    }

    /// Storage format of the standard dataset.
    pub fn memformat(&mut self) -> Result<MemoryFormat, RbrError<IF::Error>> {
        self.converse(format_args!("memformat type"))?;
        let format = self.required("type")?;
        Self::value(&format)
    }

    /// Selects the storage format used for the next logging session.
    pub fn set_memformat(&mut self, format: MemoryFormat) -> Result<(), RbrError<IF::Error>> {
        self.converse(format_args!("memformat type = {}", format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::mock::{open_with_id, L3_ID};

    #[test]
    fn test_meminfo() {
        let mut instrument = open_with_id(L3_ID);
        instrument
            .interface_mut()
            .queue_line("meminfo dataset = 1, used = 24576, remaining = 134193152, size = 134217728");
        let info = instrument.meminfo(Dataset::EasyParseSamples).unwrap();
        assert_eq!(instrument.last_command(), "meminfo dataset = 1\r\n");
        assert_eq!(
            info,
            MemoryInfo {
                used: 24576,
                remaining: 134_193_152,
                size: 134_217_728
            }
        );
    }

    #[test]
    fn test_meminfo_missing_field() {
        let mut instrument = open_with_id(L3_ID);
        instrument.interface_mut().queue_line("meminfo dataset = 1, used = 24576");
        assert!(matches!(
            instrument.meminfo(Dataset::EasyParseSamples),
            Err(RbrError::InvalidFormat)
        ));
    }

    #[test]
    fn test_memformat() {
        let mut instrument = open_with_id(L3_ID);
        instrument
            .interface_mut()
            .queue_line("memformat type = calbin00, availabletypes = rawbin00|calbin00");
        assert_eq!(instrument.memformat().unwrap(), MemoryFormat::Calbin00);

        instrument.interface_mut().queue_line("memformat type = rawbin00");
        instrument.set_memformat(MemoryFormat::Rawbin00).unwrap();
        assert_eq!(instrument.last_command(), "memformat type = rawbin00\r\n");
    }
}
