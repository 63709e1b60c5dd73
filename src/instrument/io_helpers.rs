// src/instrument/io_helpers.rs

use super::{Instrument, SampleHandler};
use crate::common::{
    command::write_command,
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
    response::strip_prompts,
    sample::{parse_sample_line, Sample},
    timing,
};
use core::fmt::{self, Debug};
use core::str;

/// What a read cycle produced.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) enum ReadOutcome {
    /// A non-sample line is available as the current response.
    Response,
    /// A streamed sample was written to the caller's output.
    Sample,
}

// Implementation block for I/O related helpers
impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Sends a wake byte if the instrument has been idle long enough to have gone to sleep.
    pub(super) fn wake_if_idle(&mut self) -> Result<(), RbrError<IF::Error>> {
        let now = self.interface.now_ms();
        let wake_needed = match self.last_activity {
            Some(last) => now.saturating_sub(last) > timing::WAKE_IDLE_THRESHOLD_MS,
            None => true,
        };

        if wake_needed {
            log::trace!("waking instrument");
            self.interface.write(&[timing::WAKE_BYTE], self.timeout)?;
            self.interface.sleep(timing::WAKE_SETTLE_DELAY);
        }
        Ok(())
    }

    /// Formats and writes a command, waking the instrument first if needed.
    pub(super) fn send_command(&mut self, args: fmt::Arguments<'_>) -> Result<(), RbrError<IF::Error>> {
        self.wake_if_idle()?;

        let timeout = self.timeout;
        let interface = &mut self.interface;
        write_command(&mut self.command, args, |bytes| {
            interface.write(bytes, timeout).map_err(RbrError::<IF::Error>::from)
        })?;

        self.last_activity = Some(self.interface.now_ms());
        log::trace!("sent {:?}", self.command.as_str());
        Ok(())
    }

    /// Reads until a complete line is buffered and makes it the current line.
    fn read_line(&mut self) -> Result<(), RbrError<IF::Error>> {
        self.message_available = false;
        self.response.discard_consumed();

        loop {
            if let Some(end) = self.response.find_terminator() {
                self.response.mark_line(end);
                self.message_available = true;
                return Ok(());
            }
            if let Err(e) = self.response.ensure_space() {
                log::warn!("response buffer overrun; buffered data dropped");
                return Err(e);
            }
            let n = self.interface.read(self.response.spare_mut(), self.timeout)?;
            self.response.commit(n);
        }
    }

    /// Reads lines until one that is not a streamed sample arrives.
    ///
    /// Every sample seen on the way goes to the handler. With `break_on_sample` set and `output`
    /// supplied, the first sample is also copied to `output` and returned immediately.
    pub(super) fn read_cycle(
        &mut self,
        break_on_sample: bool,
        mut output: Option<&mut Sample>,
    ) -> Result<ReadOutcome, RbrError<IF::Error>> {
        loop {
            self.read_line()?;

            let sample = str::from_utf8(self.response.line())
                .ok()
                .map(strip_prompts)
                .and_then(parse_sample_line);
            let Some(sample) = sample else {
                return Ok(ReadOutcome::Response);
            };

            log::debug!("streamed sample at {} ms, {} channels", sample.timestamp, sample.channels());
            self.handler.sample(&sample);
            if break_on_sample {
                if let Some(out) = output.as_deref_mut() {
                    *out = sample;
                    return Ok(ReadOutcome::Sample);
                }
            }
        }
    }

    /// Fills `buf` completely, first from bytes already buffered after the current line, then
    /// from the transport.
    pub(super) fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), RbrError<IF::Error>> {
        let mut filled = self.response.take_unread(buf);
        while filled < buf.len() {
            filled += self.interface.read(&mut buf[filled..], self.timeout)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{open_with_id, L3_ID};
    use super::*;
    use crate::common::response::MessageKind;
    use crate::common::timing::{WAKE_IDLE_THRESHOLD_MS, WAKE_SETTLE_DELAY};

    #[test]
    fn test_first_command_is_preceded_by_wake_byte() {
        let mut mock = super::super::mock::MockInterface::new();
        mock.queue_line(L3_ID);
        let instrument = Instrument::open(mock).unwrap();
        let mock = instrument.close();
        assert_eq!(mock.writes, [b"\r".to_vec(), b"id\r\n".to_vec()]);
        assert_eq!(mock.sleeps, [WAKE_SETTLE_DELAY]);
    }

    #[test]
    fn test_wake_only_after_idle_threshold() {
        let mut instrument = open_with_id(L3_ID);

        instrument.interface_mut().advance(WAKE_IDLE_THRESHOLD_MS);
        instrument.interface_mut().queue_line("id model = RBRduo3");
        instrument.converse(format_args!("id")).unwrap();
        assert_eq!(instrument.interface_mut().writes, [b"id\r\n".to_vec()]);

        instrument.interface_mut().clear_writes();
        instrument.interface_mut().advance(WAKE_IDLE_THRESHOLD_MS + 1);
        instrument.interface_mut().queue_line("id model = RBRduo3");
        instrument.converse(format_args!("id")).unwrap();
        assert_eq!(instrument.interface_mut().writes, [b"\r".to_vec(), b"id\r\n".to_vec()]);
    }

    #[test]
    fn test_line_reassembled_from_fragments() {
        let mut instrument = open_with_id(L3_ID);
        let mock = instrument.interface_mut();
        mock.queue(b"Ready: settings atmo");
        mock.queue(b"sphere = 10.1325\r");
        mock.queue(b"\n");
        instrument.converse(format_args!("settings atmosphere")).unwrap();
        assert_eq!(instrument.response(), "settings atmosphere = 10.1325");
        assert_eq!(instrument.last_message().kind, MessageKind::Info);
    }

    #[test]
    fn test_two_lines_in_one_read() {
        let mut instrument = open_with_id(L3_ID);
        instrument
            .interface_mut()
            .queue(b"streamusb state = off\r\nclock datetime = 20190207183624\r\n");
        assert!(!instrument.stream_usb().unwrap());
        assert_eq!(instrument.clock().unwrap(), 1_549_564_584_000);
    }

    #[test]
    fn test_invalid_utf8_is_info_without_text() {
        let mut instrument = open_with_id(L3_ID);
        instrument.interface_mut().queue(b"\xff\xfe\r\n");
        assert!(matches!(instrument.read_response(), Ok(())));
        let message = instrument.last_message();
        assert_eq!(message.kind, MessageKind::Info);
        assert_eq!(message.text, None);
        assert_eq!(instrument.response(), "");
    }

    #[test]
    fn test_overlong_line_overflows() {
        let mut instrument = open_with_id(L3_ID);
        let junk = [b'x'; crate::common::response::RESPONSE_BUFFER_LEN + 10];
        instrument.interface_mut().queue(&junk);
        assert!(matches!(instrument.read_response(), Err(RbrError::BufferOverflow { .. })));
        assert_eq!(instrument.last_message().kind, MessageKind::Unavailable);
    }
}
