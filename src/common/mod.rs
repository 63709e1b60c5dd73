// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod crc;
pub mod error;
pub mod generation;
pub mod hal_traits;
pub mod reading;
pub mod response;
pub mod sample;
pub mod timestamp;
pub mod timing;

#[cfg(feature = "std")]
pub mod std_interface;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{CommandBuffer, ListArg, COMMAND_BUFFER_LEN};

// From crc.rs
pub use crc::{calculate_crc16, decode_crc_wire, encode_crc_wire, verify_packet_crc, verify_payload_crc};

// From error.rs
pub use error::RbrError;

// From generation.rs
pub use generation::{feature_available, Feature, FirmwareVersion, Generation, ListSeparator};

// From hal_traits.rs
pub use hal_traits::{InstrumentClock, InstrumentTransport};

// From reading.rs
pub use reading::{flagged_reading, reading_error, reading_flag, ReadingFlag};

// From response/mod.rs (and its sub-modules via its own `pub use`)
pub use response::{Message, MessageKind, ResponseParameter, ResponseParser, RESPONSE_BUFFER_LEN};

// From sample.rs
pub use sample::{parse_sample_line, Sample, MAX_CHANNELS};

// From timing.rs (constants - users can access via common::timing::*)

#[cfg(feature = "std")]
pub use std_interface::StdInterface;
