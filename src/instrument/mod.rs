// src/instrument/mod.rs

use core::fmt::Debug;
use core::str;
use core::time::Duration;

use crate::common::{
    command::CommandBuffer,
    error::RbrError,
    generation::Generation,
    hal_traits::{InstrumentClock, InstrumentTransport},
    response::{classify, strip_prompts, Message, MessageKind, ResponseBuffer},
    sample::Sample,
    timing,
};

mod accessors;
mod bulk;
mod io_helpers;
mod transaction;

#[cfg(test)]
pub(crate) mod mock;

pub use accessors::{
    ChannelInfo, Channels, ChannelList, FetchOptions, Identity, MemoryInfo, SamplingInfo,
    SamplingMode, SerialInfo, Settings, ERROR_FEATURE_NOT_AVAILABLE,
};
pub use bulk::MAX_READ_DATA_LEN;

/// Receives samples streamed by the instrument while a command is in flight.
pub trait SampleHandler {
    fn sample(&mut self, sample: &Sample);
}

/// No handler: streamed samples are dropped.
impl SampleHandler for () {
    fn sample(&mut self, _sample: &Sample) {}
}

impl<F: FnMut(&Sample)> SampleHandler for F {
    fn sample(&mut self, sample: &Sample) {
        self(sample)
    }
}

/// A connection to one instrument, speaking the L2 or L3 command protocol.
///
/// Strictly one command is in flight at a time. Borrowed views into the last response
/// ([`response`](Self::response), [`last_message`](Self::last_message)) are tied to `&self` and so
/// cannot outlive the next communication.
#[derive(Debug)]
pub struct Instrument<IF, H = ()>
where
    IF: InstrumentTransport + InstrumentClock,
{
    interface: IF,
    handler: H,
    timeout: Duration,
    generation: Generation,
    identity: Identity,
    response: ResponseBuffer,
    command: CommandBuffer,
    last_activity: Option<u64>,
    message_available: bool,
}

impl<IF> Instrument<IF, ()>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
{
    /// Opens a connection: identifies the instrument and detects its protocol generation.
    ///
    /// # Returns
    ///
    /// * `Err(RbrError::Unsupported)` if the firmware type belongs to no known generation.
    /// * Any communication error from the `id` exchange.
    pub fn open(interface: IF) -> Result<Self, RbrError<IF::Error>> {
        Self::open_with_handler(interface, ())
    }
}

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Like [`open`](Instrument::open), routing streamed samples to `handler` from the start.
    pub fn open_with_handler(interface: IF, handler: H) -> Result<Self, RbrError<IF::Error>> {
        let mut instrument = Instrument {
            interface,
            handler,
            timeout: timing::DEFAULT_TIMEOUT,
            // Provisional until `id` answers; no generation-specific parsing happens before.
            generation: Generation::L3,
            identity: Identity::default(),
            response: ResponseBuffer::new(),
            command: CommandBuffer::new(),
            last_activity: None,
            message_available: false,
        };

        let identity = instrument.id()?;
        let Some(generation) = identity.generation() else {
            return Err(RbrError::Unsupported);
        };
        instrument.generation = generation;
        log::debug!(
            "opened {} serial {} (fwtype {}, {})",
            identity.model,
            identity.serial,
            identity.fwtype,
            instrument.generation
        );
        instrument.identity = identity;
        Ok(instrument)
    }

    /// Replaces the sample handler.
    pub fn with_handler<H2: SampleHandler>(self, handler: H2) -> Instrument<IF, H2> {
        Instrument {
            interface: self.interface,
            handler,
            timeout: self.timeout,
            generation: self.generation,
            identity: self.identity,
            response: self.response,
            command: self.command,
            last_activity: self.last_activity,
            message_available: self.message_available,
        }
    }

    /// Closes the connection, handing the transport back.
    pub fn close(self) -> IF {
        self.interface
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Protocol generation detected at open time.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Identity reported at open time.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Timeout handed to the transport on every read and write.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the timeout passed to the transport from now on.
    ///
    /// Whether it takes effect is up to the transport. `StdInterface::new` ignores it and relies
    /// on the port's own timeouts; `StdInterface::with_timeout_setter` applies it.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Text of the last command sent, including its terminator.
    pub fn last_command(&self) -> &str {
        self.command.as_str()
    }

    /// The line read by the last read cycle, without prompts or terminator.
    ///
    /// Empty if no line is available or the line is not valid UTF-8.
    pub fn response(&self) -> &str {
        if !self.message_available {
            return "";
        }
        str::from_utf8(self.response.line())
            .map(strip_prompts)
            .unwrap_or("")
    }

    /// Classification of the line read by the last read cycle.
    pub fn last_message(&self) -> Message<'_> {
        if !self.message_available {
            return Message::UNAVAILABLE;
        }
        match str::from_utf8(self.response.line()) {
            Ok(line) => classify(strip_prompts(line)),
            Err(_) => Message {
                kind: MessageKind::Info,
                number: 0,
                text: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{open_with_id, MockInterface, MockIoError, L2_ID, L3_ID};
    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_open_identifies_l3_instrument() {
        let mut mock = MockInterface::new();
        mock.queue_line(L3_ID);
        let instrument = Instrument::open(mock).unwrap();

        assert_eq!(instrument.generation(), Generation::L3);
        let id = instrument.identity();
        assert_eq!(id.model.as_str(), "RBRduo3");
        assert_eq!(id.version.as_str(), "1.092");
        assert_eq!(id.serial, 923456);
        assert_eq!(id.fwtype, 104);
        assert_eq!(instrument.last_command(), "id\r\n");

        let mock = instrument.close();
        assert_eq!(mock.writes.last().unwrap(), b"id\r\n");
    }

    #[test]
    fn test_open_identifies_l2_instrument() {
        let instrument = open_with_id(L2_ID);
        assert_eq!(instrument.generation(), Generation::L2);
        assert_eq!(instrument.identity().fwtype, 103);
    }

    #[test]
    fn test_open_rejects_unknown_fwtype() {
        let mut mock = MockInterface::new();
        mock.queue_line("id model = RBRvirtuoso, version = 1.000, serial = 1, fwtype = 42");
        assert!(matches!(Instrument::open(mock), Err(RbrError::Unsupported)));
    }

    #[test]
    fn test_open_without_answer_times_out() {
        assert!(matches!(Instrument::open(MockInterface::new()), Err(RbrError::Timeout)));

        let mut mock = MockInterface::new();
        mock.fail_writes();
        assert!(matches!(Instrument::open(mock), Err(RbrError::Io(MockIoError))));
    }

    #[test]
    fn test_message_unavailable_before_communication() {
        let instrument = open_with_id(L3_ID);
        assert_eq!(instrument.last_message().kind, MessageKind::Info);

        let fresh: Instrument<MockInterface> = Instrument {
            interface: MockInterface::new(),
            handler: (),
            timeout: timing::DEFAULT_TIMEOUT,
            generation: Generation::L3,
            identity: Identity::default(),
            response: ResponseBuffer::new(),
            command: CommandBuffer::new(),
            last_activity: None,
            message_available: false,
        };
        assert_eq!(fresh.last_message(), Message::UNAVAILABLE);
        assert_eq!(fresh.response(), "");
    }

    #[test]
    fn test_timeout_passed_through() {
        let mut instrument = open_with_id(L3_ID);
        instrument.set_timeout(Duration::from_millis(250));
        instrument.interface_mut().queue_line("clock datetime = 20190207183624");
        instrument.clock().unwrap();
        let timeouts = &instrument.interface_mut().timeouts;
        assert_eq!(*timeouts.last().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_with_handler_receives_streamed_samples() {
        let instrument = open_with_id(L3_ID);
        let mut seen = Vec::new();
        let mut instrument = instrument.with_handler(|s: &Sample| seen.push(s.timestamp));

        instrument
            .interface_mut()
            .queue_line("2019-02-07 18:36:24.250, 10.1234, 20.5");
        instrument.interface_mut().queue_line("streamusb state = on");
        assert!(instrument.stream_usb().unwrap());
        drop(instrument);

        assert_eq!(seen, [1_549_564_584_250]);
    }
}
