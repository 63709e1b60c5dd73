// src/instrument/accessors/channels.rs

use core::fmt::Debug;

use crate::common::{
    error::RbrError,
    generation::Feature,
    hal_traits::{InstrumentClock, InstrumentTransport},
    sample::MAX_CHANNELS,
};
use crate::instrument::{Instrument, SampleHandler};

/// Answer to `channels`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Channels {
    /// Channels the instrument has.
    pub count: u8,
    /// Channels currently enabled.
    pub on: u8,
}

/// One channel of the `channel all` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    /// 1-based channel index.
    pub index: u8,
    pub channel_type: heapless::String<16>,
    pub label: heapless::String<32>,
}

pub type ChannelList = heapless::Vec<ChannelInfo, MAX_CHANNELS>;

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    pub fn channels(&mut self) -> Result<Channels, RbrError<IF::Error>> {
        self.converse(format_args!("channels"))?;
        let count = self.required("count")?;
        let on = self.required("on")?;
        Ok(Channels {
            count: Self::value(&count)?,
            on: Self::value(&on)?,
        })
    }

    /// Lists every channel with its type and label.
    ///
    /// Parameters are grouped by the channel index that precedes them in the response.
    pub fn channel_list(&mut self) -> Result<ChannelList, RbrError<IF::Error>> {
        if !self.supports(Feature::IndexedChannelListing) {
            return Err(RbrError::Unsupported);
        }
        self.converse(format_args!("channel all"))?;

        let mut list = ChannelList::new();
        let mut current_group = 0;
        for p in self.parameters() {
            if p.index == 0 {
                continue;
            }
            if p.index != current_group {
                current_group = p.index;
                let Some(index) = p.index_value.and_then(|v| v.parse().ok()) else {
                    return Err(RbrError::InvalidFormat);
                };
                let channel = ChannelInfo {
                    index,
                    ..ChannelInfo::default()
                };
                if list.push(channel).is_err() {
                    return Err(RbrError::BufferOverflow {
                        needed: MAX_CHANNELS + 1,
                        got: MAX_CHANNELS,
                    });
                }
            }
            let Some(channel) = list.last_mut() else {
                return Err(RbrError::InvalidFormat);
            };
            match p.key {
                "type" => channel.channel_type = Self::bounded(p.value)?,
                "label" => channel.label = Self::bounded(p.value)?,
                _ => {}
            }
        }
        Ok(list)
    }
}
