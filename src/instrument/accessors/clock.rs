// src/instrument/accessors/clock.rs

use core::fmt::Debug;

use crate::common::{
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
    timestamp::{clock_timestamp, parse_clock_timestamp},
};
use crate::instrument::{Instrument, SampleHandler};

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// The instrument's clock, in milliseconds since the Unix epoch (whole seconds).
    pub fn clock(&mut self) -> Result<i64, RbrError<IF::Error>> {
        self.converse(format_args!("clock datetime"))?;
        let datetime = self.required("datetime")?;
        parse_clock_timestamp(datetime.value).ok_or(RbrError::InvalidFormat)
    }

    /// Sets the instrument's clock. Sub-second precision is dropped.
    pub fn set_clock(&mut self, epoch_ms: i64) -> Result<(), RbrError<IF::Error>> {
        let Some(datetime) = clock_timestamp(epoch_ms) else {
            return Err(RbrError::InvalidParameter("clock out of range"));
        };
        self.converse(format_args!("clock datetime = {}", datetime))
    }
}
