// src/common/error.rs

/// Errors returned by every fallible operation in this crate.
///
/// `E` is the error type of the caller's transport (see
/// [`InstrumentTransport`](super::hal_traits::InstrumentTransport)). Operations that never touch
/// the transport (tokenizing, the binary dataset parser) use the default `E = ()`.
#[derive(Debug, thiserror::Error)]
pub enum RbrError<E = ()>
where
    E: core::fmt::Debug,
{
    /// The read or write callback reported an unrecoverable failure.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// No (matching) data arrived before the callback's timeout elapsed.
    #[error("Operation timed out")]
    Timeout,

    /// The instrument answered with an `E####` error line.
    ///
    /// The full message text is available from the instrument's last message until the next
    /// communication.
    #[error("Instrument reported error E{number:04}")]
    Hardware { number: u16 },

    /// The feature is not available for the detected generation or firmware.
    #[error("Feature not supported by this instrument")]
    Unsupported,

    /// A caller-supplied argument was rejected before anything was sent.
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(&'static str),

    /// The CRC trailing a bulk data transfer did not match the payload.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    ChecksumMismatch { expected: u16, calculated: u16 },

    /// A response line or a command did not fit into its fixed-size buffer.
    #[error("Buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },

    /// A response was received but could not be interpreted.
    #[error("Invalid response format")]
    InvalidFormat,
}

impl<E: core::fmt::Debug> RbrError<E> {
    /// Whether the transport, rather than the instrument or the caller, caused the failure.
    pub fn is_communication_error(&self) -> bool {
        matches!(self, RbrError::Io(_) | RbrError::Timeout)
    }
}

/// Errors from the transport can be propagated with `?`.
impl<E: core::fmt::Debug> From<nb::Error<E>> for RbrError<E> {
    fn from(e: nb::Error<E>) -> Self {
        match e {
            nb::Error::WouldBlock => RbrError::Timeout,
            nb::Error::Other(e) => RbrError::Io(e),
        }
    }
}
