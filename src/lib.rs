// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)] // no_std unless std is requested

pub mod common;
pub mod dataset;
pub mod instrument;

// Re-export key types for convenience
pub use common::{Generation, RbrError, Sample};
pub use dataset::{Dataset, DatasetParser, ParserConfig};
pub use instrument::{Instrument, SampleHandler};
