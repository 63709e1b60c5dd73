// src/instrument/accessors/streaming.rs

use core::fmt::{self, Debug};

use crate::common::{
    command::ListArg,
    error::RbrError,
    generation::{Feature, ListSeparator},
    hal_traits::{InstrumentClock, InstrumentTransport},
    sample::Sample,
};
use crate::instrument::io_helpers::ReadOutcome;
use crate::instrument::{Instrument, SampleHandler};

/// Arguments to [`Instrument::fetch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions<'a> {
    /// Channel labels to measure; empty measures every enabled channel.
    pub channels: &'a [&'a str],
    /// Whether the instrument goes back to sleep after answering; `None` keeps its default.
    pub sleep_after: Option<bool>,
}

/// Optional ` <channel list>` argument of `fetch`.
struct ChannelArg<'a>(ListArg<'a>, bool);

impl fmt::Display for ChannelArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, " {}", self.0)?;
        }
        Ok(())
    }
}

/// Optional ` sleepafter = on|off` argument of `fetch`.
struct SleepAfterArg(Option<bool>);

impl fmt::Display for SleepAfterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(true) => f.write_str(" sleepafter = on"),
            Some(false) => f.write_str(" sleepafter = off"),
            None => Ok(()),
        }
    }
}

fn valid_label(label: &str) -> bool {
    !label.is_empty() && !label.contains([' ', '|', ','])
}

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Whether samples are streamed over USB as they are measured.
    pub fn stream_usb(&mut self) -> Result<bool, RbrError<IF::Error>> {
        self.converse(format_args!("streamusb state"))?;
        let state = self.required("state")?;
        match state.on_off() {
            Some(on) => Ok(on),
            None => Err(RbrError::InvalidFormat),
        }
    }

    pub fn set_stream_usb(&mut self, on: bool) -> Result<(), RbrError<IF::Error>> {
        let state = if on { "on" } else { "off" };
        self.converse(format_args!("streamusb state = {}", state))
    }

    /// Requests a single measurement and waits for the resulting sample.
    ///
    /// The sample is written to `out` and also passed to the sample handler.
    ///
    /// # Returns
    ///
    /// * `Err(RbrError::InvalidParameter)` for an empty label or one containing a separator.
    /// * `Err(RbrError::Unsupported)` for a channel selection the firmware cannot take.
    /// * `Err(RbrError::InvalidFormat)` if the instrument answered with something other than a
    ///   sample.
    pub fn fetch(
        &mut self,
        options: &FetchOptions<'_>,
        out: &mut Sample,
    ) -> Result<(), RbrError<IF::Error>> {
        if !options.channels.iter().all(|label| valid_label(label)) {
            return Err(RbrError::InvalidParameter("invalid channel label"));
        }
        let selecting = !options.channels.is_empty();
        if selecting && !self.supports(Feature::FetchChannelSelection) {
            return Err(RbrError::Unsupported);
        }

        let channels = ChannelArg(ListArg::new(options.channels, ListSeparator::Pipe), selecting);
        self.send_command(format_args!(
            "fetch{}{}",
            channels,
            SleepAfterArg(options.sleep_after)
        ))?;

        match self.await_response(true, Some(out))? {
            ReadOutcome::Sample => Ok(()),
            ReadOutcome::Response => Err(RbrError::InvalidFormat),
        }
    }

    /// Waits for the next streamed sample without sending anything.
    pub fn next_sample(&mut self, out: &mut Sample) -> Result<(), RbrError<IF::Error>> {
        loop {
            if self.read_cycle(true, Some(&mut *out))? == ReadOutcome::Sample {
                return Ok(());
            }
            log::trace!("skipping {:?} while waiting for a sample", self.response());
        }
    }
}
