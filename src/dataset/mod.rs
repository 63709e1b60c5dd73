// src/dataset/mod.rs

//! Decoder for data downloaded from instrument memory.
//!
//! Independent of any connection: feed it byte chunks obtained with
//! [`Instrument::read_data`](crate::instrument::Instrument::read_data) (or from a file) and it
//! reports one [`Sample`] or [`Event`] per complete record. Bytes of a trailing partial record
//! are left for the caller to prepend to the next chunk.

mod easyparse;
mod events;

pub use easyparse::sample_record_len;
pub use events::{Event, EventType, EVENT_RECORD_LEN, MAX_EVENT_AUX};

use core::fmt;
use core::str::FromStr;

use crate::common::error::RbrError;
use crate::common::sample::{Sample, MAX_CHANNELS};

/// On-instrument storage format of the standard dataset (`memformat`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MemoryFormat {
    None,
    Rawbin00,
    Calbin00,
}

impl MemoryFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            MemoryFormat::None => "none",
            MemoryFormat::Rawbin00 => "rawbin00",
            MemoryFormat::Calbin00 => "calbin00",
        }
    }
}

impl fmt::Display for MemoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryFormat {
    type Err = RbrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MemoryFormat::None),
            "rawbin00" => Ok(MemoryFormat::Rawbin00),
            "calbin00" => Ok(MemoryFormat::Calbin00),
            _ => Err(RbrError::InvalidFormat),
        }
    }
}

/// Datasets held in instrument memory, numbered as the instrument numbers them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Dataset {
    Standard = 0,
    EasyParseSamples = 1,
    EasyParseEvents = 2,
}

impl Dataset {
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// How downloaded data is laid out.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParserConfig {
    /// EasyParse sample and event datasets.
    EasyParse { channels: usize },
    /// The standard dataset in one of the legacy memory formats. Not decodable.
    Standard { format: MemoryFormat, channels: usize },
}

/// Receives decoded records.
pub trait DatasetHandler {
    fn sample(&mut self, sample: &Sample);
    fn event(&mut self, event: &Event);
}

impl<S, E> DatasetHandler for (S, E)
where
    S: FnMut(&Sample),
    E: FnMut(&Event),
{
    fn sample(&mut self, sample: &Sample) {
        (self.0)(sample)
    }

    fn event(&mut self, event: &Event) {
        (self.1)(event)
    }
}

/// A configured decoder. Keeps no state between [`parse`](Self::parse) calls.
#[derive(Debug)]
pub struct DatasetParser<H> {
    channels: usize,
    handler: H,
}

fn validate(config: ParserConfig) -> Result<usize, RbrError> {
    match config {
        ParserConfig::EasyParse { channels } if channels == 0 || channels > MAX_CHANNELS => {
            Err(RbrError::InvalidParameter("channel count must be between 1 and MAX_CHANNELS"))
        }
        ParserConfig::EasyParse { channels } => Ok(channels),
        ParserConfig::Standard { .. } => Err(RbrError::Unsupported),
    }
}

impl<H: DatasetHandler> DatasetParser<H> {
    pub fn new(config: ParserConfig, handler: H) -> Result<Self, RbrError> {
        Ok(DatasetParser {
            channels: validate(config)?,
            handler,
        })
    }

    /// Replaces the configuration. The parser is unchanged if the new one is rejected.
    pub fn configure(&mut self, config: ParserConfig) -> Result<(), RbrError> {
        self.channels = validate(config)?;
        Ok(())
    }

    pub fn config(&self) -> ParserConfig {
        ParserConfig::EasyParse {
            channels: self.channels,
        }
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Size of one record of `dataset`.
    pub fn record_len(&self, dataset: Dataset) -> Result<usize, RbrError> {
        match dataset {
            Dataset::EasyParseSamples => Ok(sample_record_len(self.channels)),
            Dataset::EasyParseEvents => Ok(EVENT_RECORD_LEN),
            Dataset::Standard => Err(RbrError::Unsupported),
        }
    }

    /// Decodes every complete record in `data`, calling the handler once per record in order.
    ///
    /// Returns the number of bytes consumed, always a whole multiple of the record size.
    pub fn parse(&mut self, dataset: Dataset, data: &[u8]) -> Result<usize, RbrError> {
        let record_len = self.record_len(dataset)?;
        let records = data.chunks_exact(record_len);
        let consumed = data.len() - records.remainder().len();

        for record in records {
            match dataset {
                Dataset::EasyParseSamples => {
                    let sample = easyparse::decode_sample(record, self.channels);
                    self.handler.sample(&sample);
                }
                Dataset::EasyParseEvents => {
                    let event = events::decode_event(record);
                    self.handler.event(&event);
                }
                Dataset::Standard => return Err(RbrError::Unsupported),
            }
        }

        log::trace!("decoded {} bytes of dataset {}", consumed, dataset);
        Ok(consumed)
    }
}
