//! Software UART - Transmitter Code
//!
//! This module is for bit-banging data out of the TX pin.

use core::fmt;

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_0_2::serial as eh0;
use embedded_hal_nb::serial::{ErrorType, Write};

use crate::bit_clock::BitClock;
use crate::timing::{wait_until, Clock, Duration};
use crate::Error;

/// Transmit half of a [`SoftUart`]. Obtained by calling [`SoftUart::split()`]
///
/// [`SoftUart`]: crate::SoftUart
/// [`SoftUart::split()`]: crate::SoftUart::split
pub struct Writer<TX, C> {
    pub(crate) tx: TX,
    pub(crate) clock: C,
    pub(crate) period: Duration,
}

impl<TX: OutputPin, C: Clock> Writer<TX, C> {
    pub(crate) fn new(tx: TX, clock: C, bit_clock: &BitClock) -> Self {
        Self {
            tx,
            clock,
            period: bit_clock.period(),
        }
    }

    /// Drive the line idle, then switch to the new bit period. On error the old period
    /// stays in effect.
    pub(crate) fn configure(&mut self, bit_clock: &BitClock) -> Result<(), Error> {
        self.idle()?;
        self.period = bit_clock.period();
        Ok(())
    }

    /// Drive the line to its idle (high) level.
    pub(crate) fn idle(&mut self) -> Result<(), Error> {
        self.tx.set_high().map_err(Error::pin)
    }

    /// Bit-bang one frame: start bit, 8 data bits LSB first, stop bit.
    ///
    /// The last data bit is held for one extra bit period before the stop bit is driven.
    /// Receivers built against this timing rely on that margin.
    fn transmit(&mut self, byte: u8) -> Result<(), Error> {
        let start = self.clock.now();
        let mut data = byte;

        self.tx.set_low().map_err(Error::pin)?;
        wait_until(&self.clock, start, self.period, 1);

        for index in 2..=9 {
            self.tx
                .set_state(PinState::from(data & 1 == 1))
                .map_err(Error::pin)?;
            wait_until(&self.clock, start, self.period, index);
            data >>= 1;
        }

        wait_until(&self.clock, start, self.period, 10);
        self.tx.set_high().map_err(Error::pin)?;
        wait_until(&self.clock, start, self.period, 11);

        Ok(())
    }

    /// Transmit one frame with interrupts masked, so no receive edge can stretch the
    /// bit timing.
    fn transmit_atomic(&mut self, byte: u8) -> Result<(), Error> {
        critical_section::with(|_| self.transmit(byte))
    }

    /// Writes one byte.
    ///
    /// Interrupts, including the receive edge interrupt, are masked for the duration of
    /// the frame. This function blocks until the stop bit has been sent.
    pub fn write(&mut self, byte: u8) -> Result<(), Error> {
        self.transmit_atomic(byte)
    }

    /// Writes bytes up to, not including, the first zero byte.
    ///
    /// Each byte is sent with interrupts masked, but they are unmasked again between two
    /// bytes, so incoming data can be received at byte boundaries. Returns the number of
    /// bytes sent.
    pub fn send(&mut self, data: &[u8]) -> Result<usize, Error> {
        let mut sent = 0;
        for &byte in data.iter().take_while(|&&byte| byte != 0) {
            self.transmit_atomic(byte)?;
            sent += 1;
        }
        trace!("sent {=usize} bytes", sent);
        Ok(sent)
    }

    /// Writes every byte of `data`, zero bytes included, each one atomically.
    ///
    /// This function blocks until the full buffer has been sent.
    pub fn write_full_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        data.iter().try_for_each(|&byte| self.transmit_atomic(byte))
    }

    /// Duration of one bit.
    pub fn bit_period(&self) -> Duration {
        self.period
    }
}

impl<TX: OutputPin, C: Clock> ErrorType for Writer<TX, C> {
    type Error = Error;
}

impl<TX: OutputPin, C: Clock> Write<u8> for Writer<TX, C> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.transmit_atomic(word).map_err(nb::Error::Other)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        // Every write returns after its stop bit.
        Ok(())
    }
}

impl<TX: OutputPin, C: Clock> eh0::Write<u8> for Writer<TX, C> {
    type Error = Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.transmit_atomic(word).map_err(nb::Error::Other)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

impl<TX: OutputPin, C: Clock> embedded_io::ErrorType for Writer<TX, C> {
    type Error = Error;
}

impl<TX: OutputPin, C: Clock> embedded_io::Write for Writer<TX, C> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_full_blocking(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<TX: OutputPin, C: Clock> fmt::Write for Writer<TX, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.bytes()
            .try_for_each(|c| self.transmit_atomic(c))
            .map_err(|_| fmt::Error)
    }
}
