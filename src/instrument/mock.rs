// src/instrument/mock.rs

//! Scripted transport for tests.

use std::collections::VecDeque;
use std::vec::Vec;

use core::time::Duration;

use crate::common::hal_traits::{InstrumentClock, InstrumentTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockIoError;

/// Transport whose reads replay queued chunks. A read with nothing queued times out.
#[derive(Debug, Default)]
pub struct MockInterface {
    reads: VecDeque<Vec<u8>>,
    /// Every write, in order.
    pub writes: Vec<Vec<u8>>,
    /// Every sleep requested through the clock.
    pub sleeps: Vec<Duration>,
    /// Timeouts handed to read/write calls.
    pub timeouts: Vec<Duration>,
    now: u64,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes to be returned by a single read (split if the caller's buffer is smaller).
    pub fn queue(&mut self, bytes: &[u8]) {
        self.reads.push_back(bytes.to_vec());
    }

    /// Queues a response line, appending `\r\n`.
    pub fn queue_line(&mut self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.reads.push_back(bytes);
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }

    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// All written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }
}

impl InstrumentTransport for MockInterface {
    type Error = MockIoError;

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> nb::Result<usize, Self::Error> {
        self.timeouts.push(timeout);
        if self.fail_reads {
            return Err(nb::Error::Other(MockIoError));
        }
        let Some(mut chunk) = self.reads.pop_front() else {
            return Err(nb::Error::WouldBlock);
        };
        if chunk.len() > buf.len() {
            let rest = chunk.split_off(buf.len());
            self.reads.push_front(rest);
        }
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    fn write(&mut self, data: &[u8], timeout: Duration) -> nb::Result<(), Self::Error> {
        self.timeouts.push(timeout);
        if self.fail_writes {
            return Err(nb::Error::Other(MockIoError));
        }
        self.writes.push(data.to_vec());
        Ok(())
    }
}

impl InstrumentClock for MockInterface {
    fn now_ms(&mut self) -> u64 {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now += duration.as_millis() as u64;
    }
}

/// `id` response of an L3 instrument.
pub const L3_ID: &str = "id model = RBRduo3, version = 1.092, serial = 923456, fwtype = 104";

/// `id` response of an L2 instrument.
pub const L2_ID: &str = "id model = RBRconcerto, version = 1.360, serial = 65432, fwtype = 103";

/// Opens an instrument answering `id` with `id_line`, then forgets the writes made by opening.
pub fn open_with_id(id_line: &str) -> super::Instrument<MockInterface> {
    let mut mock = MockInterface::new();
    mock.queue_line(id_line);
    let mut instrument = super::Instrument::open(mock).unwrap();
    instrument.interface_mut().clear_writes();
    instrument
}
