//! Receive frame buffering
//!
//! Bytes decoded by the receiver are collected in a [`FrameBuffer`] until either the
//! buffer fills up or the configured terminator byte arrives. At that point the buffer is
//! flushed: its contents are handed to a sink as one frame and the buffer starts over.
//!
//! The buffer is kept NUL-terminated at the cursor at all times, which is why a zero byte
//! can never be part of a frame and why only `capacity - 1` bytes are usable.

use core::ops::Deref;

/// Why a frame was completed.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushCause {
    /// The buffer reached its usable length.
    Overflow,
    /// The configured terminator byte was received.
    Terminator,
}

/// A completed frame, as delivered to the registered handler.
///
/// Holds the frame bytes without the terminating zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame<const N: usize> {
    bytes: heapless::Vec<u8, N>,
}

impl<const N: usize> Frame<N> {
    /// Copy `bytes` into a new frame, truncating to `N` bytes.
    pub fn new(bytes: &[u8]) -> Self {
        let mut frame = Self::default();
        let len = bytes.len().min(N);
        // Cannot fail, the slice was truncated to the capacity.
        let _ = frame.bytes.extend_from_slice(&bytes[..len]);
        frame
    }

    /// The frame contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<const N: usize> Deref for Frame<N> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for Frame<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame({=[u8]})", self.as_bytes())
    }
}

/// Bounded receive buffer with a cursor and an optional terminator byte.
///
/// `N` is the backing storage. The capacity actually in use can be lowered at runtime
/// with [`set_capacity`](Self::set_capacity).
pub struct FrameBuffer<const N: usize> {
    buffer: [u8; N],
    capacity: usize,
    cursor: usize,
    terminator: u8,
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// An empty buffer using all `N` bytes of storage and no terminator.
    pub const fn new() -> Self {
        assert!(N >= 2, "a frame buffer needs room for one byte and its terminator");
        Self {
            buffer: [0; N],
            capacity: N,
            cursor: 0,
            terminator: 0,
        }
    }

    /// Capacity in use, including the slot for the terminating zero.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity in use. Discards any buffered bytes.
    ///
    /// Returns `false`, leaving the buffer untouched, when `capacity` is below 2 or above
    /// `N`.
    pub fn set_capacity(&mut self, capacity: usize) -> bool {
        if !(2..=N).contains(&capacity) {
            return false;
        }
        self.capacity = capacity;
        self.reset();
        true
    }

    /// The terminator byte, 0 if disabled.
    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    /// Set the terminator byte. 0 disables terminator-triggered flushes.
    pub fn set_terminator(&mut self, terminator: u8) {
        self.terminator = terminator;
    }

    /// Number of bytes buffered since the last flush.
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// `true` if nothing was buffered since the last flush.
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Append a received byte, flushing into `sink` for every frame it completes.
    ///
    /// A zero byte is dropped and leaves the buffer untouched. The overflow and terminator
    /// checks are independent and run in that order. A terminator that also fills the
    /// buffer therefore completes two frames: the full buffer, then an empty one.
    ///
    /// Returns the number of frames handed to `sink`.
    pub fn append<F>(&mut self, byte: u8, mut sink: F) -> usize
    where
        F: FnMut(&[u8], FlushCause),
    {
        if byte == 0 {
            return 0;
        }

        self.buffer[self.cursor] = byte;
        self.cursor += 1;
        self.buffer[self.cursor] = 0;

        let mut flushed = 0;
        if self.cursor == self.capacity - 1 {
            self.flush(|bytes| sink(bytes, FlushCause::Overflow));
            flushed += 1;
        }
        if self.terminator != 0 && byte == self.terminator {
            self.flush(|bytes| sink(bytes, FlushCause::Terminator));
            flushed += 1;
        }
        flushed
    }

    /// Hand the buffered bytes to `sink`, then reset.
    pub fn flush<F>(&mut self, sink: F)
    where
        F: FnOnce(&[u8]),
    {
        sink(self.as_bytes());
        self.reset();
    }

    /// Drop the buffered bytes.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.buffer[0] = 0;
    }

    /// The bytes buffered since the last flush.
    ///
    /// This is a view into the live buffer, the next append changes it.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }

    /// Like [`as_bytes`](Self::as_bytes), including the terminating zero.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buffer[..=self.cursor]
    }
}
