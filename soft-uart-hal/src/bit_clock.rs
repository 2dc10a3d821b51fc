//! Baud rate to bit period conversion
//!
//! The bit period is kept in whole microseconds. The integer quotient is rounded up when
//! the discarded fraction is more than half a microsecond, evaluated at a resolution of
//! 1/100 µs. This exact rule is what peers built against this design expect, e.g.
//! 9600 Bd gives 104 µs and 115200 Bd gives 9 µs.

use fugit::HertzU32;

use crate::timing::Duration;
use crate::Error;

/// Microseconds per bit for the given baud rate.
///
/// Fails with [`Error::InvalidBaudRate`] when `baud` is 0, or when the rounded period
/// would be 0 µs (2 MBd and above).
pub const fn bit_period_micros(baud: u32) -> Result<u32, Error> {
    if baud == 0 {
        return Err(Error::InvalidBaudRate);
    }

    let mut period = 1_000_000 / baud;
    if (100_000_000 / baud) - (100 * period) > 50 {
        period += 1;
    }

    if period == 0 {
        Err(Error::InvalidBaudRate)
    } else {
        Ok(period)
    }
}

/// Bit timing derived from a baud rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitClock {
    baudrate: HertzU32,
    period: Duration,
}

impl BitClock {
    /// Derive the bit period for `baudrate`.
    pub fn new(baudrate: HertzU32) -> Result<Self, Error> {
        let period = bit_period_micros(baudrate.to_Hz())?;
        Ok(Self {
            baudrate,
            period: Duration::from_ticks(period),
        })
    }

    /// The baud rate this clock was derived from.
    pub fn baudrate(&self) -> HertzU32 {
        self.baudrate
    }

    /// Duration of one bit.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Delay from the start edge to the sampling anchor, a third of a bit.
    pub(crate) fn start_offset(&self) -> Duration {
        self.period / 3
    }
}
