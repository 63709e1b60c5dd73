// src/instrument/accessors/mod.rs

//! Per-feature accessors. Each is one conversation plus a pass of the tokenizer over the answer.

mod channels;
mod clock;
mod identity;
mod link;
mod memory;
mod sampling;
mod settings;
mod streaming;

pub use channels::{ChannelInfo, ChannelList, Channels};
pub use identity::Identity;
pub use link::SerialInfo;
pub use memory::MemoryInfo;
pub use sampling::{SamplingInfo, SamplingMode};
pub use settings::Settings;
pub use streaming::FetchOptions;

use core::fmt::Debug;
use core::str::FromStr;

use super::{Instrument, SampleHandler};
use crate::common::{
    error::RbrError,
    generation::{Generation, ListSeparator},
    hal_traits::{InstrumentClock, InstrumentTransport},
    response::{ResponseParameter, ResponseParser},
};

/// Instrument error number for "feature not available".
pub const ERROR_FEATURE_NOT_AVAILABLE: u16 = 109;

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Tokenizer over the current response.
    pub fn parameters(&self) -> ResponseParser<'_> {
        ResponseParser::new(self.response())
    }

    /// The first parameter named `key` in the current response.
    pub(in crate::instrument) fn required(
        &self,
        key: &str,
    ) -> Result<ResponseParameter<'_>, RbrError<IF::Error>> {
        match self.parameters().find_key(key) {
            Some(parameter) => Ok(parameter),
            None => Err(RbrError::InvalidFormat),
        }
    }

    /// Parses a parameter value, treating anything unparsable as a malformed response.
    pub(in crate::instrument) fn value<T: FromStr>(
        parameter: &ResponseParameter<'_>,
    ) -> Result<T, RbrError<IF::Error>> {
        parameter.parse().ok_or(RbrError::InvalidFormat)
    }

    /// Copies `s` into a fixed-capacity string.
    fn bounded<const N: usize>(s: &str) -> Result<heapless::String<N>, RbrError<IF::Error>> {
        let mut out = heapless::String::new();
        if out.push_str(s).is_err() {
            return Err(RbrError::BufferOverflow {
                needed: s.len(),
                got: N,
            });
        }
        Ok(out)
    }

    /// Parses every item of a list value.
    fn list<T: FromStr, const N: usize>(
        parameter: &ResponseParameter<'_>,
        separator: ListSeparator,
    ) -> Result<heapless::Vec<T, N>, RbrError<IF::Error>> {
        let mut out = heapless::Vec::new();
        for item in parameter.list(separator) {
            let Ok(parsed) = item.parse::<T>() else {
                return Err(RbrError::InvalidFormat);
            };
            if out.push(parsed).is_err() {
                return Err(RbrError::BufferOverflow {
                    needed: N + 1,
                    got: N,
                });
            }
        }
        Ok(out)
    }

    /// Selector asking for every parameter of a command; L2 lists them all by default.
    fn all_selector(&self) -> &'static str {
        match self.generation {
            Generation::L2 => "",
            Generation::L3 => " all",
        }
    }
}
