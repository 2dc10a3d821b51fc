//! Software UART for microcontrollers with only general purpose I/O to spare
//!
//! This is an implementation of an asynchronous serial transceiver on top of the
//! [`embedded-hal`] digital pin traits. The transmit pin is bit-banged and the receive
//! pin is sampled from a falling-edge interrupt, both paced by busy-waiting against a
//! monotonic microsecond [`Clock`](timing::Clock).
//!
//! Framing is fixed to 8 data bits, no parity and one stop bit, on an idle-high line.
//!
//! ## Usage
//!
//! ```ignore
//! use fugit::RateExtU32;
//! use soft_uart_hal::{FrameQueue, SoftUart, UartConfig, Event};
//!
//! static mut QUEUE: FrameQueue<128, 4> = FrameQueue::new();
//!
//! let queue = unsafe { &mut *core::ptr::addr_of_mut!(QUEUE) };
//! let mut uart = SoftUart::new(rx_pin, tx_pin, timer, queue, UartConfig::new(9600.Hz(), 128))
//!     .unwrap();
//!
//! let mut on_line = |line: &[u8]| { /* handle a complete line */ };
//! uart.on(Event::Data, b'\n', Some(&mut on_line));
//!
//! // Move the receive half into the GPIO interrupt handler, keep the rest here.
//! let (reader, mut writer, mut dispatcher) = uart.split();
//!
//! writer.send(b"AT\r\n\0").unwrap();
//! loop {
//!     dispatcher.dispatch();
//! }
//! ```
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod bit_clock;
pub mod config;
pub mod dispatch;
mod error;
pub mod frame;
pub mod gpio;
mod peripheral;
mod reader;
pub mod timing;
mod writer;

#[cfg(feature = "rp2040")]
pub mod rp2040;

pub use bit_clock::BitClock;
pub use config::UartConfig;
pub use dispatch::{Dispatcher, Event, FrameQueue, Handler};
pub use error::Error;
pub use frame::{FlushCause, Frame, FrameBuffer};
pub use gpio::{EdgeInterruptPin, Interrupt};
pub use peripheral::SoftUart;
pub use reader::Reader;
pub use timing::{Clock, Duration, Instant};
pub use writer::Writer;
