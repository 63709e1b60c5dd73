// src/common/std_interface.rs

//! Adapter from any [`std::io::Read`] + [`std::io::Write`] port to the instrument traits.
//!
//! Serial ports (e.g. `serialport::SerialPort`) and [`std::net::TcpStream`] both fit. A plain
//! [`StdInterface::new`] ignores the timeout passed with each call: the port's own read/write
//! timeouts govern how long a call blocks, so configure them before wrapping the port. Built with
//! [`StdInterface::with_timeout_setter`], the adapter hands each new timeout to the port instead.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use super::hal_traits::{InstrumentClock, InstrumentTransport};

/// Applies a read/write timeout to a port, e.g. `SerialPort::set_timeout`.
pub type TimeoutSetter<P> = fn(&mut P, Duration) -> std::io::Result<()>;

/// Wraps a blocking `std` port, using [`Instant`] as the monotonic clock.
#[derive(Debug)]
pub struct StdInterface<P> {
    port: P,
    epoch: Instant,
    set_timeout: Option<TimeoutSetter<P>>,
    applied: Option<Duration>,
}

impl<P: Read + Write> StdInterface<P> {
    /// Wraps `port` as is; the timeouts passed by the driver are not applied.
    pub fn new(port: P) -> Self {
        StdInterface {
            port,
            epoch: Instant::now(),
            set_timeout: None,
            applied: None,
        }
    }

    /// Wraps `port` and calls `set_timeout` before a read or write whenever the driver's timeout
    /// differs from the one last applied.
    ///
    /// ```ignore
    /// let iface = StdInterface::with_timeout_setter(port, |p, t| Ok(p.set_timeout(t)?));
    /// ```
    pub fn with_timeout_setter(port: P, set_timeout: TimeoutSetter<P>) -> Self {
        StdInterface {
            set_timeout: Some(set_timeout),
            ..StdInterface::new(port)
        }
    }

    /// Returns the wrapped port.
    pub fn into_inner(self) -> P {
        self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<P> StdInterface<P> {
    fn apply_timeout(&mut self, timeout: Duration) -> nb::Result<(), std::io::Error> {
        let Some(set_timeout) = self.set_timeout else {
            return Ok(());
        };
        if self.applied == Some(timeout) {
            return Ok(());
        }
        set_timeout(&mut self.port, timeout).map_err(nb::Error::Other)?;
        self.applied = Some(timeout);
        log::trace!("port timeout set to {:?}", timeout);
        Ok(())
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

impl<P: Read + Write> InstrumentTransport for StdInterface<P> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> nb::Result<usize, Self::Error> {
        self.apply_timeout(timeout)?;
        loop {
            match self.port.read(buf) {
                Ok(0) if !buf.is_empty() => {
                    return Err(nb::Error::Other(ErrorKind::UnexpectedEof.into()));
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(e.kind()) => return Err(nb::Error::WouldBlock),
                Err(e) => return Err(nb::Error::Other(e)),
            }
        }
    }

    fn write(&mut self, data: &[u8], timeout: Duration) -> nb::Result<(), Self::Error> {
        self.apply_timeout(timeout)?;
        let result = self.port.write_all(data).and_then(|()| self.port.flush());
        match result {
            Ok(()) => Ok(()),
            Err(e) if is_timeout(e.kind()) => Err(nb::Error::WouldBlock),
            Err(e) => Err(nb::Error::Other(e)),
        }
    }
}

impl<P> InstrumentClock for StdInterface<P> {
    fn now_ms(&mut self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
