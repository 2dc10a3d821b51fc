//! A simulated serial line for host tests.
//!
//! Time is a shared tick counter that advances by one microsecond each time the clock is
//! read, so busy-wait loops terminate. The TX pin records every level change with its
//! timestamp; the RX pin reports the level recorded at the current time. Replaying a
//! recorded frame into the receiver is a matter of rewinding the clock to its start edge.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use soft_uart_hal::{
    Clock, EdgeInterruptPin, Error, FrameQueue, Instant, Interrupt, SoftUart, UartConfig,
};

#[derive(Default)]
struct State {
    now: Cell<u32>,
    edges: RefCell<Vec<(u32, bool)>>,
    forced_rx: Cell<Option<bool>>,
    rx_interrupt: Cell<bool>,
    rx_log: RefCell<Vec<(Interrupt, bool)>>,
    rx_clears: Cell<u32>,
    reads_while_armed: Cell<u32>,
}

/// Handle to the shared line state. Cheap to clone.
#[derive(Clone, Default)]
pub struct Line {
    state: Rc<State>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> SimClock {
        SimClock(self.clone())
    }

    pub fn tx(&self) -> SimTx {
        SimTx(self.clone())
    }

    pub fn rx(&self) -> SimRx {
        SimRx(self.clone())
    }

    /// Current time, without advancing it.
    pub fn peek(&self) -> u32 {
        self.state.now.get()
    }

    pub fn set_now(&self, now: u32) {
        self.state.now.set(now);
    }

    /// Level on the line at `time`. Idle high before the first edge.
    pub fn level_at(&self, time: u32) -> bool {
        if let Some(level) = self.state.forced_rx.get() {
            return level;
        }
        self.state
            .edges
            .borrow()
            .iter()
            .rev()
            .find(|(at, _)| *at <= time)
            .map(|(_, level)| *level)
            .unwrap_or(true)
    }

    /// Make the RX pin read `level` regardless of what TX recorded.
    pub fn force_rx(&self, level: Option<bool>) {
        self.state.forced_rx.set(level);
    }

    /// Recorded (time, level) pairs, in order.
    pub fn edges(&self) -> Vec<(u32, bool)> {
        self.state.edges.borrow().clone()
    }

    /// Rewind the clock to the first falling edge recorded at or after `since`.
    ///
    /// Returns the time of that edge.
    pub fn rewind_to_fall(&self, since: u32) -> u32 {
        let edges = self.state.edges.borrow();
        let mut previous = true;
        for &(at, level) in edges.iter() {
            if at >= since && previous && !level {
                self.state.now.set(at);
                return at;
            }
            previous = level;
        }
        panic!("no falling edge recorded since {}", since);
    }

    pub fn rx_interrupt_enabled(&self) -> bool {
        self.state.rx_interrupt.get()
    }

    pub fn rx_interrupt_log(&self) -> Vec<(Interrupt, bool)> {
        self.state.rx_log.borrow().clone()
    }

    pub fn rx_interrupt_clears(&self) -> u32 {
        self.state.rx_clears.get()
    }

    /// RX reads made while the edge interrupt was armed.
    pub fn reads_while_armed(&self) -> u32 {
        self.state.reads_while_armed.get()
    }
}

#[derive(Clone)]
pub struct SimClock(Line);

impl Clock for SimClock {
    fn now(&self) -> Instant {
        let now = self.0.state.now.get();
        self.0.state.now.set(now.wrapping_add(1));
        Instant::from_ticks(now)
    }
}

pub struct SimTx(Line);

impl ErrorType for SimTx {
    type Error = Infallible;
}

impl OutputPin for SimTx {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let now = self.0.peek();
        self.0.state.edges.borrow_mut().push((now, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let now = self.0.peek();
        self.0.state.edges.borrow_mut().push((now, true));
        Ok(())
    }
}

pub struct SimRx(Line);

impl ErrorType for SimRx {
    type Error = Infallible;
}

impl InputPin for SimRx {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let state = &self.0.state;
        if state.rx_interrupt.get() {
            state.reads_while_armed.set(state.reads_while_armed.get() + 1);
        }
        Ok(self.0.level_at(self.0.peek()))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|level| !level)
    }
}

impl EdgeInterruptPin for SimRx {
    fn set_interrupt_enabled(&mut self, interrupt: Interrupt, enabled: bool) {
        assert_eq!(interrupt, Interrupt::EdgeLow);
        self.0.state.rx_interrupt.set(enabled);
        self.0.state.rx_log.borrow_mut().push((interrupt, enabled));
    }

    fn clear_interrupt(&mut self, _interrupt: Interrupt) {
        self.0.state.rx_clears.set(self.0.state.rx_clears.get() + 1);
    }
}

/// An RX pin that stays idle and ignores interrupt configuration.
pub struct IdleRx;

impl ErrorType for IdleRx {
    type Error = Infallible;
}

impl InputPin for IdleRx {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

impl EdgeInterruptPin for IdleRx {
    fn set_interrupt_enabled(&mut self, _interrupt: Interrupt, _enabled: bool) {}

    fn clear_interrupt(&mut self, _interrupt: Interrupt) {}
}

pub type SimUart<'q, 'h, const N: usize, const Q: usize> =
    SoftUart<'q, 'h, SimRx, SimTx, SimClock, N, Q>;

/// Loopback instance on a fresh line: TX and RX are the same wire.
pub fn sim_uart<'q, 'h, const N: usize, const Q: usize>(
    line: &Line,
    queue: &'q mut FrameQueue<N, Q>,
    config: UartConfig,
) -> SimUart<'q, 'h, N, Q> {
    SoftUart::new(line.rx(), line.tx(), line.clock(), queue, config).unwrap()
}

/// Transmit `byte` and replay the recorded frame into the receiver.
///
/// Returns what the receive interrupt handler returned.
pub fn transfer<const N: usize, const Q: usize>(
    line: &Line,
    uart: &mut SimUart<'_, '_, N, Q>,
    byte: u8,
) -> Result<Option<u8>, Error> {
    let mark = line.peek();
    uart.write(byte).unwrap();
    let end = line.peek();
    line.rewind_to_fall(mark);
    let received = uart.on_interrupt();
    // Continue after the transmitted frame so the next one does not overlap.
    line.set_now(end.max(line.peek()) + 1);
    received
}

/// [`transfer`] every byte of `bytes`.
pub fn transfer_all<const N: usize, const Q: usize>(
    line: &Line,
    uart: &mut SimUart<'_, '_, N, Q>,
    bytes: &[u8],
) {
    for &byte in bytes {
        transfer(line, uart, byte).unwrap();
    }
}
