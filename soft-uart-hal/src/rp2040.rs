//! Glue for running the software UART on an RP2040
//!
//! The RP2040 timer counts microseconds, so it can be used as the [`Clock`] directly. Any
//! SIO input pin can be the RX pin; route `IO_IRQ_BANK0` to a handler that calls
//! [`Reader::on_interrupt`](crate::Reader::on_interrupt).

use rp2040_hal::gpio::{self, FunctionSioInput, Pin, PinId, PullType};
use rp2040_hal::timer::Timer;

use crate::gpio::{EdgeInterruptPin, Interrupt};
use crate::timing::{Clock, Instant};

impl Clock for Timer {
    #[inline]
    fn now(&self) -> Instant {
        Instant::from_ticks(self.get_counter_low())
    }
}

impl From<Interrupt> for gpio::Interrupt {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::LevelLow => gpio::Interrupt::LevelLow,
            Interrupt::LevelHigh => gpio::Interrupt::LevelHigh,
            Interrupt::EdgeLow => gpio::Interrupt::EdgeLow,
            Interrupt::EdgeHigh => gpio::Interrupt::EdgeHigh,
        }
    }
}

impl<I: PinId, P: PullType> EdgeInterruptPin for Pin<I, FunctionSioInput, P> {
    #[inline]
    fn set_interrupt_enabled(&mut self, interrupt: Interrupt, enabled: bool) {
        Pin::set_interrupt_enabled(self, interrupt.into(), enabled);
    }

    #[inline]
    fn clear_interrupt(&mut self, interrupt: Interrupt) {
        Pin::clear_interrupt(self, interrupt.into());
    }
}
