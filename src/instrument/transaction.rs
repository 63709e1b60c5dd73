// src/instrument/transaction.rs

use super::io_helpers::ReadOutcome;
use super::{Instrument, SampleHandler};
use crate::common::{
    error::RbrError,
    hal_traits::{InstrumentClock, InstrumentTransport},
    response::{MessageKind, ResponseParser},
    sample::Sample,
};
use core::fmt::{self, Debug};

impl<IF, H> Instrument<IF, H>
where
    IF: InstrumentTransport + InstrumentClock,
    IF::Error: Debug,
    H: SampleHandler,
{
    /// Sends a command and waits for its response.
    ///
    /// Lines that do not answer the command (streamed samples, leftovers of earlier exchanges)
    /// are skipped. The matching response stays available through [`response`](Self::response)
    /// and [`last_message`](Self::last_message) until the next communication.
    ///
    /// # Arguments
    ///
    /// * `command` - The command text, typically from `format_args!`. The `\r\n` terminator is
    ///   appended if missing.
    ///
    /// # Returns
    ///
    /// * `Ok(())` for a matching response or a warning.
    /// * `Err(RbrError::Hardware)` if the instrument answered with an error; the message keeps
    ///   its number and text.
    /// * `Err(RbrError::Timeout)` if the transport timed out before a matching response arrived.
    pub fn converse(&mut self, command: fmt::Arguments<'_>) -> Result<(), RbrError<IF::Error>> {
        self.send_command(command)?;
        self.await_response(false, None).map(|_| ())
    }

    /// Reads one response cycle without sending anything.
    ///
    /// Streamed samples go to the handler; the first other line becomes the response.
    pub fn read_response(&mut self) -> Result<(), RbrError<IF::Error>> {
        self.read_cycle(false, None)?;
        self.check_message()
    }

    fn check_message(&self) -> Result<(), RbrError<IF::Error>> {
        let message = self.last_message();
        match message.kind {
            MessageKind::Error => Err(RbrError::Hardware {
                number: message.number,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the current line is an info response to the last command sent.
    fn answers_last_command(&self) -> bool {
        ResponseParser::new(self.response()).command() == self.command.name()
    }

    /// Reads until the response to the last command (or, with `break_on_sample`, a sample) arrives.
    pub(super) fn await_response(
        &mut self,
        break_on_sample: bool,
        mut output: Option<&mut Sample>,
    ) -> Result<ReadOutcome, RbrError<IF::Error>> {
        loop {
            if self.read_cycle(break_on_sample, output.as_deref_mut())? == ReadOutcome::Sample {
                return Ok(ReadOutcome::Sample);
            }

            match self.last_message().kind {
                MessageKind::Error | MessageKind::Warning => {
                    self.check_message()?;
                    return Ok(ReadOutcome::Response);
                }
                MessageKind::Info if self.answers_last_command() => {
                    return Ok(ReadOutcome::Response);
                }
                _ => {
                    log::trace!(
                        "skipping {:?} while waiting for {:?}",
                        self.response(),
                        self.command.name()
                    );
                }
            }
        }
    }
}
