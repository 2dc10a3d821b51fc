//! GPIO capabilities the receiver needs beyond [`InputPin`]
//!
//! The receive side is driven by an edge interrupt on the RX pin. The driver arms it on a
//! falling edge, disarms it while a byte is being sampled and re-arms it afterwards. Which
//! interrupt vector the pin is routed to, and attaching the handler that calls
//! [`Reader::on_interrupt`](crate::Reader::on_interrupt), is left to the application.

use embedded_hal::digital::InputPin;

/// Interrupt kind.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// While low
    LevelLow,
    /// While high
    LevelHigh,
    /// On falling edge
    EdgeLow,
    /// On rising edge
    EdgeHigh,
}

/// An input pin that can raise an interrupt.
pub trait EdgeInterruptPin: InputPin {
    /// Enable or disable interrupt generation for `interrupt`.
    fn set_interrupt_enabled(&mut self, interrupt: Interrupt, enabled: bool);

    /// Clear a latched `interrupt`.
    ///
    /// Edge interrupts stay latched until cleared, including edges seen while the
    /// interrupt was disabled.
    fn clear_interrupt(&mut self, interrupt: Interrupt);
}

impl<T: EdgeInterruptPin + ?Sized> EdgeInterruptPin for &mut T {
    #[inline]
    fn set_interrupt_enabled(&mut self, interrupt: Interrupt, enabled: bool) {
        T::set_interrupt_enabled(self, interrupt, enabled)
    }

    #[inline]
    fn clear_interrupt(&mut self, interrupt: Interrupt) {
        T::clear_interrupt(self, interrupt)
    }
}
