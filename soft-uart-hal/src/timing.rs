//! Time source and busy-wait pacing
//!
//! All bit timing in this crate is derived from a free-running microsecond counter. The
//! counter is 32 bits wide and allowed to wrap; [`Instant`] comparisons take the wrap into
//! account, so a rollover in the middle of a frame does not stretch or cut a bit.

/// Instant type used by the transmitter and the receiver.
pub type Instant = fugit::TimerInstantU32<1_000_000>;

/// Duration type used for bit periods.
pub type Duration = fugit::MicrosDurationU32;

/// A monotonic microsecond counter.
///
/// Implementations must be cheap to call: the receiver polls it in a tight loop from
/// interrupt context.
pub trait Clock {
    /// Current value of the counter.
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Spin until `clock` reaches `start + period * index`.
///
/// Deadlines are computed from a fixed `start` rather than chained from the previous
/// wait, so the time spent between two calls does not accumulate into the bit grid.
#[inline]
pub fn wait_until<C: Clock + ?Sized>(clock: &C, start: Instant, period: Duration, index: u32) {
    let deadline = start + period * index;
    while clock.now() < deadline {
        core::hint::spin_loop();
    }
}
