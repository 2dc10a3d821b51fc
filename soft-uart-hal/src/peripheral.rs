//! Software UART - Bi-directional Instance Code
//!
//! This module brings together `reader`, `writer` and `dispatch` to give a SoftUart
//! object that can both read and write.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::{ErrorType, Write};

use crate::config::UartConfig;
use crate::dispatch::{Dispatcher, Event, FrameQueue, Handler};
use crate::gpio::EdgeInterruptPin;
use crate::reader::Reader;
use crate::timing::{Clock, Duration, Instant};
use crate::writer::Writer;
use crate::Error;

/// A software UART on one RX and one TX pin.
///
/// `N` is the backing capacity of the receive frame buffer, `Q` the size of the frame
/// queue between the receive interrupt and [`dispatch`](Self::dispatch).
///
/// Every instance owns its own configuration, buffer and handler, so several instances
/// can run side by side on different pins.
pub struct SoftUart<'q, 'h, RX, TX, C, const N: usize = 128, const Q: usize = 4> {
    reader: Reader<'q, RX, C, N, Q>,
    writer: Writer<TX, C>,
    dispatcher: Dispatcher<'q, 'h, N, Q>,
}

impl<'q, 'h, RX, TX, C, const N: usize, const Q: usize> SoftUart<'q, 'h, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    /// Set up a software UART.
    ///
    /// Drives TX to its idle level and arms the falling-edge interrupt on RX. Completed
    /// frames are passed through `queue`.
    pub fn new(
        rx: RX,
        tx: TX,
        clock: C,
        queue: &'q mut FrameQueue<N, Q>,
        config: UartConfig,
    ) -> Result<Self, Error> {
        let bit_clock = config.validate(N)?;
        let (producer, consumer) = queue.split();

        let mut uart = Self {
            reader: Reader::new(rx, clock.clone(), &bit_clock, producer),
            writer: Writer::new(tx, clock, &bit_clock),
            dispatcher: Dispatcher::new(consumer),
        };
        uart.apply(config, &bit_clock)?;
        Ok(uart)
    }

    /// Replace the configuration.
    ///
    /// The configuration is validated before anything is changed; on error the previous
    /// one stays in effect. Discards any partially received frame.
    pub fn setup(&mut self, config: UartConfig) -> Result<(), Error> {
        let bit_clock = config.validate(N)?;
        self.apply(config, &bit_clock)
    }

    fn apply(&mut self, config: UartConfig, bit_clock: &crate::BitClock) -> Result<(), Error> {
        debug!(
            "soft uart setup: {=u32} Bd, {=u32} us/bit, {=usize} byte buffer",
            config.baudrate.to_Hz(),
            bit_clock.period().ticks(),
            config.buffer_size
        );
        // Only the TX side can fail. RX is left alone until it has succeeded.
        self.writer.configure(bit_clock)?;
        self.reader.configure(bit_clock, config.buffer_size);
        Ok(())
    }

    /// Register a handler for `event`, replacing any previous one. `None` clears it.
    ///
    /// `terminator` is the byte that completes a frame early, 0 to only complete frames
    /// when the buffer is full.
    pub fn on(&mut self, event: Event, terminator: u8, handler: Option<Handler<'h>>) {
        match event {
            Event::Data => {
                self.reader.set_terminator(terminator);
                self.dispatcher.on(event, handler);
            }
        }
    }

    /// String keyed form of [`on`](Self::on).
    ///
    /// The terminator is the first byte of `terminator`, or none if it is empty. Unknown
    /// event names are ignored.
    pub fn on_named(&mut self, event: &str, terminator: &[u8], handler: Option<Handler<'h>>) {
        if let Some(event) = Event::from_name(event) {
            self.on(event, terminator.first().copied().unwrap_or(0), handler);
        }
    }

    /// Writes one byte, with interrupts masked for the duration of the frame.
    pub fn write(&mut self, byte: u8) -> Result<(), Error> {
        self.writer.write(byte)
    }

    /// Writes bytes up to, not including, the first zero byte. Interrupts are masked
    /// while each byte is on the line and serviced in between.
    pub fn send(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.writer.send(data)
    }

    /// Writes every byte of `data`, zero bytes included.
    pub fn write_full_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        self.writer.write_full_blocking(data)
    }

    /// The bytes received since the last completed frame.
    pub fn get_buffer(&self) -> &[u8] {
        self.reader.buffer()
    }

    /// Like [`get_buffer`](Self::get_buffer), including the terminating zero.
    pub fn get_buffer_with_nul(&self) -> &[u8] {
        self.reader.buffer_with_nul()
    }

    /// Handle a falling edge on the RX pin. See [`Reader::on_interrupt`].
    pub fn on_interrupt(&mut self) -> Result<Option<u8>, Error> {
        self.reader.on_interrupt()
    }

    /// Run the registered handler for every completed frame. See [`Dispatcher::dispatch`].
    pub fn dispatch(&mut self) -> usize {
        self.dispatcher.dispatch()
    }

    /// Number of completed frames waiting for [`dispatch`](Self::dispatch).
    pub fn pending(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Number of completed frames lost because the frame queue was full.
    pub fn dropped_frames(&self) -> u32 {
        self.reader.dropped_frames()
    }

    /// Time of the most recent falling edge handled.
    pub fn last_edge(&self) -> Option<Instant> {
        self.reader.last_edge()
    }

    /// Duration of one bit.
    pub fn bit_period(&self) -> Duration {
        self.writer.bit_period()
    }

    /// Split this instance into its receive, transmit and dispatch parts.
    ///
    /// The [`Reader`] goes to the RX interrupt handler; the [`Writer`] and the
    /// [`Dispatcher`] stay in normal execution context.
    pub fn split(self) -> (Reader<'q, RX, C, N, Q>, Writer<TX, C>, Dispatcher<'q, 'h, N, Q>) {
        (self.reader, self.writer, self.dispatcher)
    }

    /// Join the parts back together into the original instance.
    ///
    /// The parts can be obtained by calling [`split`].
    ///
    /// [`split`]: #method.split
    pub fn join(
        reader: Reader<'q, RX, C, N, Q>,
        writer: Writer<TX, C>,
        dispatcher: Dispatcher<'q, 'h, N, Q>,
    ) -> Self {
        Self {
            reader,
            writer,
            dispatcher,
        }
    }

    /// Disarms the receive interrupt and releases the pins and the clock.
    pub fn free(mut self) -> (RX, TX, C) {
        self.reader.disable_rx_interrupt();
        (self.reader.rx, self.writer.tx, self.writer.clock)
    }
}

impl<RX, TX, C, const N: usize, const Q: usize> ErrorType for SoftUart<'_, '_, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    type Error = Error;
}

impl<RX, TX, C, const N: usize, const Q: usize> Write<u8> for SoftUart<'_, '_, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        Write::write(&mut self.writer, word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Write::flush(&mut self.writer)
    }
}

impl<RX, TX, C, const N: usize, const Q: usize> embedded_io::ErrorType
    for SoftUart<'_, '_, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    type Error = Error;
}

impl<RX, TX, C, const N: usize, const Q: usize> embedded_io::Write
    for SoftUart<'_, '_, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(&mut self.writer, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(&mut self.writer)
    }
}

impl<RX, TX, C, const N: usize, const Q: usize> fmt::Write for SoftUart<'_, '_, RX, TX, C, N, Q>
where
    RX: EdgeInterruptPin,
    TX: OutputPin,
    C: Clock + Clone,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        fmt::Write::write_str(&mut self.writer, s)
    }
}
