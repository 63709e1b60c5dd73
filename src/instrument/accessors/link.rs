// src/instrument/accessors/link.rs

use core::fmt::Debug;

use crate::common::{
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
};
use crate::instrument::{Instrument, SampleHandler};

/// Capacity for the advertised baud-rate list.
pub const MAX_BAUD_RATES: usize = 16;

/// Answer to `serial`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialInfo {
    pub baud_rate: u32,
    pub available_baud_rates: heapless::Vec<u32, MAX_BAUD_RATES>,
}

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Current baud rate of the serial link and the rates it can switch to.
    pub fn serial(&mut self) -> Result<SerialInfo, RbrError<IF::Error>> {
        let selector = self.all_selector();
        self.converse(format_args!("serial{}", selector))?;

        let separator = self.generation.list_separator();
        let mut baud_rate: Option<u32> = None;
        let mut available_baud_rates: heapless::Vec<u32, MAX_BAUD_RATES> = heapless::Vec::new();
        for p in self.parameters() {
            match p.key {
                "baudrate" => baud_rate = Some(Self::value(&p)?),
                "availablebaudrates" => available_baud_rates = Self::list(&p, separator)?,
                _ => {}
            }
        }

        match baud_rate {
            Some(baud_rate) => Ok(SerialInfo {
                baud_rate,
                available_baud_rates,
            }),
            None => Err(RbrError::InvalidFormat),
        }
    }

    /// Switches the serial link to `baud_rate`, which must be one the instrument advertises.
    ///
    /// The instrument answers at the old rate; the caller reconfigures its port afterwards.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), RbrError<IF::Error>> {
        let info = self.serial()?;
        if !info.available_baud_rates.contains(&baud_rate) {
            return Err(RbrError::InvalidParameter("baud rate not available"));
        }
        self.converse(format_args!("serial baudrate = {}", baud_rate))
    }
}
