// src/common/hal_traits.rs

use core::fmt::Debug;
use core::time::Duration;

/// Abstraction for the time source and delays used by the conversation engine.
pub trait InstrumentClock {
    /// Monotonic milliseconds. The epoch is arbitrary; only differences are used.
    fn now_ms(&mut self) -> u64;

    /// Blocks for at least `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Abstraction for the byte transport (serial, USB CDC, WiFi socket...) to an instrument.
///
/// Both methods block for at most `timeout`. The library never enforces the timeout itself; it
/// hands the connection's configured value through and acts on what the callback reports.
pub trait InstrumentTransport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Reads at most `buf.len()` bytes into `buf`, returning how many were read.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` when no data arrived within `timeout`. Other errors
    /// are returned as `Err(nb::Error::Other(Self::Error))` and abort the current operation.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> nb::Result<usize, Self::Error>;

    /// Writes all of `data`.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the bytes could not be sent within `timeout`.
    fn write(&mut self, data: &[u8], timeout: Duration) -> nb::Result<(), Self::Error>;
}

/// Mutable references to an interface are interfaces as well, so a connection can borrow a
/// transport it does not own.
impl<T: InstrumentClock + ?Sized> InstrumentClock for &mut T {
    fn now_ms(&mut self) -> u64 {
        (**self).now_ms()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<T: InstrumentTransport + ?Sized> InstrumentTransport for &mut T {
    type Error = T::Error;

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> nb::Result<usize, Self::Error> {
        (**self).read(buf, timeout)
    }

    fn write(&mut self, data: &[u8], timeout: Duration) -> nb::Result<(), Self::Error> {
        (**self).write(data, timeout)
    }
}
