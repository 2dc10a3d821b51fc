//! Software UART - Receiver Code
//!
//! This module decodes bytes from the RX pin. Decoding is started by a falling edge
//! interrupt on the pin and runs to completion inside that interrupt:
//!
//! ```text
//!  idle  start   bit 0   bit 1         bit 7   stop
//! ‾‾‾‾‾‾\______/‾‾‾‾‾‾‾\_______ ... ___/‾‾‾‾‾‾‾‾‾‾‾‾‾
//!       ^  ^       ^       ^               ^       ^
//!       |  |       |       |               |       +-- interrupt re-armed
//!       |  |       +-------+--- ... -------+-- samples, one bit apart
//!       |  +-- anchor, a third of a bit after the edge
//!       +-- edge interrupt, disarmed until the byte is done
//! ```

use heapless::spsc::Producer;

use crate::bit_clock::BitClock;
use crate::frame::{FlushCause, Frame, FrameBuffer};
use crate::gpio::{EdgeInterruptPin, Interrupt};
use crate::timing::{wait_until, Clock, Duration, Instant};
use crate::Error;

/// Receive half of a [`SoftUart`]. Obtained by calling [`SoftUart::split()`]
///
/// Meant to be moved into the interrupt handler of the RX pin, which then only has to
/// call [`on_interrupt`](Self::on_interrupt).
///
/// [`SoftUart`]: crate::SoftUart
/// [`SoftUart::split()`]: crate::SoftUart::split
pub struct Reader<'a, RX, C, const N: usize, const Q: usize> {
    pub(crate) rx: RX,
    pub(crate) clock: C,
    pub(crate) period: Duration,
    pub(crate) start_offset: Duration,
    pub(crate) buffer: FrameBuffer<N>,
    pub(crate) producer: Producer<'a, Frame<N>, Q>,
    pub(crate) last_edge: Option<Instant>,
    pub(crate) dropped: u32,
}

impl<'a, RX: EdgeInterruptPin, C: Clock, const N: usize, const Q: usize> Reader<'a, RX, C, N, Q> {
    pub(crate) fn new(
        rx: RX,
        clock: C,
        bit_clock: &BitClock,
        producer: Producer<'a, Frame<N>, Q>,
    ) -> Self {
        Self {
            rx,
            clock,
            period: bit_clock.period(),
            start_offset: bit_clock.start_offset(),
            buffer: FrameBuffer::new(),
            producer,
            last_edge: None,
            dropped: 0,
        }
    }

    /// Apply new timing and buffer capacity, then arm the receive interrupt.
    ///
    /// `buffer_size` must already have been validated against `N`.
    pub(crate) fn configure(&mut self, bit_clock: &BitClock, buffer_size: usize) {
        self.disable_rx_interrupt();
        self.period = bit_clock.period();
        self.start_offset = bit_clock.start_offset();
        let resized = self.buffer.set_capacity(buffer_size);
        debug_assert!(resized, "buffer size {} out of range", buffer_size);
        self.rx.clear_interrupt(Interrupt::EdgeLow);
        self.enable_rx_interrupt();
    }

    /// Handle a falling edge on the RX pin.
    ///
    /// Call this from the interrupt handler. It blocks for about ten bit periods while the
    /// byte is sampled, with the edge interrupt disabled, and re-arms the interrupt before
    /// returning.
    ///
    /// Returns the byte that was appended to the frame buffer, or `None` when the edge was
    /// a glitch or the byte decoded as zero. If reading the pin fails the byte is
    /// abandoned and the error returned; the interrupt is re-armed all the same.
    pub fn on_interrupt(&mut self) -> Result<Option<u8>, Error> {
        let edge = self.clock.now();
        self.last_edge = Some(edge);
        self.rx.set_interrupt_enabled(Interrupt::EdgeLow, false);

        let result = self.sample(edge).map(|byte| self.store(byte));

        // Data bits latch falling edges of their own while sampling.
        self.rx.clear_interrupt(Interrupt::EdgeLow);
        self.rx.set_interrupt_enabled(Interrupt::EdgeLow, true);

        if let Err(_err) = &result {
            warn!("rx sampling failed: {}", _err);
        }
        result
    }

    /// Decode one byte, starting from the falling edge at `edge`.
    fn sample(&mut self, edge: Instant) -> Result<u8, Error> {
        if self.rx.is_high().map_err(Error::pin)? {
            // The line is back up already: not a start bit.
            trace!("rx glitch rejected");
            wait_until(&self.clock, edge, self.period, 1);
            return Ok(0);
        }

        wait_until(&self.clock, edge, self.start_offset, 1);
        let anchor = self.clock.now();

        let mut byte = 0u8;
        for index in 1..=8 {
            wait_until(&self.clock, anchor, self.period, index);
            byte >>= 1;
            if self.rx.is_high().map_err(Error::pin)? {
                byte |= 0x80;
            }
        }

        // Stop bit
        wait_until(&self.clock, anchor, self.period, 9);
        Ok(byte)
    }

    /// Append `byte` to the frame buffer, queueing every frame it completes.
    fn store(&mut self, byte: u8) -> Option<u8> {
        if byte == 0 {
            return None;
        }

        let producer = &mut self.producer;
        let dropped = &mut self.dropped;
        self.buffer.append(byte, |bytes, cause| {
            match cause {
                FlushCause::Overflow => {
                    debug!("frame complete: buffer full, {=usize} bytes", bytes.len());
                }
                FlushCause::Terminator => {
                    debug!("frame complete: terminator, {=usize} bytes", bytes.len());
                }
            }
            if producer.enqueue(Frame::new(bytes)).is_err() {
                *dropped = dropped.wrapping_add(1);
                warn!("frame queue full, dropping {=usize} bytes", bytes.len());
            }
        });

        Some(byte)
    }

    /// The bytes received since the last completed frame.
    ///
    /// The interrupt handler appends to this buffer. Read it from a critical section or
    /// with the RX interrupt disabled.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Like [`buffer`](Self::buffer), including the terminating zero.
    pub fn buffer_with_nul(&self) -> &[u8] {
        self.buffer.as_bytes_with_nul()
    }

    /// Set the byte that completes a frame. 0 disables it.
    pub fn set_terminator(&mut self, terminator: u8) {
        self.buffer.set_terminator(terminator);
    }

    /// The byte that completes a frame, 0 if disabled.
    pub fn terminator(&self) -> u8 {
        self.buffer.terminator()
    }

    /// Time of the most recent falling edge handled.
    pub fn last_edge(&self) -> Option<Instant> {
        self.last_edge
    }

    /// Number of completed frames lost because the frame queue was full.
    pub fn dropped_frames(&self) -> u32 {
        self.dropped
    }

    /// Enables the Receive Interrupt.
    ///
    /// The RX pin will raise its interrupt on the next falling edge.
    pub fn enable_rx_interrupt(&mut self) {
        self.rx.set_interrupt_enabled(Interrupt::EdgeLow, true);
    }

    /// Disables the Receive Interrupt.
    pub fn disable_rx_interrupt(&mut self) {
        self.rx.set_interrupt_enabled(Interrupt::EdgeLow, false);
    }
}
