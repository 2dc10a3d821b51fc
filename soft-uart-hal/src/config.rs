//! Configuration of a software UART instance

use fugit::HertzU32;

use crate::bit_clock::BitClock;
use crate::Error;

/// Frame buffer size used when none is given.
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// A struct holding the configuration for a software UART.
///
/// The `Default` implementation implements the following values:
/// ```ignore
/// # // can't actually create this with the non_exhaustive attribute
/// UartConfig {
///    baudrate: Baud(9600),
///    buffer_size: 128,
///}
/// ```
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// The baudrate the uart will run at.
    pub baudrate: HertzU32,

    /// Size of the receive frame buffer, including the slot for the terminating zero.
    ///
    /// A frame is handed off once `buffer_size - 1` bytes have been received. Must be at
    /// least 2 and at most the backing capacity of the instance.
    pub buffer_size: usize,
}

impl UartConfig {
    /// Create a new instance of UartConfig
    pub const fn new(baudrate: HertzU32, buffer_size: usize) -> UartConfig {
        UartConfig {
            baudrate,
            buffer_size,
        }
    }

    /// Check this configuration against a backing capacity of `capacity` bytes.
    pub(crate) fn validate(&self, capacity: usize) -> Result<BitClock, Error> {
        let bit_clock = BitClock::new(self.baudrate)?;
        if self.buffer_size < 2 || self.buffer_size > capacity {
            return Err(Error::BadArgument);
        }
        Ok(bit_clock)
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: HertzU32::from_raw(9600),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Common configurations for the software UART.
///
/// All of them use the default buffer size. Data bits, parity and stop bits are fixed.
pub mod common_configs {
    use super::{UartConfig, DEFAULT_BUFFER_SIZE};
    use fugit::HertzU32;

    /// 9600 baud, 8 data bits, no parity, 1 stop bit
    pub const _9600_8_N_1: UartConfig =
        UartConfig::new(HertzU32::from_raw(9600), DEFAULT_BUFFER_SIZE);

    /// 19200 baud, 8 data bits, no parity, 1 stop bit
    pub const _19200_8_N_1: UartConfig =
        UartConfig::new(HertzU32::from_raw(19200), DEFAULT_BUFFER_SIZE);

    /// 38400 baud, 8 data bits, no parity, 1 stop bit
    pub const _38400_8_N_1: UartConfig =
        UartConfig::new(HertzU32::from_raw(38400), DEFAULT_BUFFER_SIZE);

    /// 57600 baud, 8 data bits, no parity, 1 stop bit
    pub const _57600_8_N_1: UartConfig =
        UartConfig::new(HertzU32::from_raw(57600), DEFAULT_BUFFER_SIZE);

    /// 115200 baud, 8 data bits, no parity, 1 stop bit
    pub const _115200_8_N_1: UartConfig =
        UartConfig::new(HertzU32::from_raw(115200), DEFAULT_BUFFER_SIZE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn default_is_9600_with_128_bytes() {
        let config = UartConfig::default();
        assert_eq!(config, common_configs::_9600_8_N_1);
        assert_eq!(config.validate(128).unwrap().period().ticks(), 104);
    }

    #[test]
    fn buffer_size_must_fit_backing_storage() {
        assert_eq!(
            UartConfig::new(9600.Hz(), 129).validate(128),
            Err(Error::BadArgument)
        );
        assert_eq!(
            UartConfig::new(9600.Hz(), 1).validate(128),
            Err(Error::BadArgument)
        );
        assert!(UartConfig::new(9600.Hz(), 2).validate(128).is_ok());
        assert!(UartConfig::new(9600.Hz(), 16).validate(16).is_ok());
    }

    #[test]
    fn baud_rate_is_checked_first() {
        assert_eq!(
            UartConfig::new(0.Hz(), 0).validate(128),
            Err(Error::InvalidBaudRate)
        );
    }
}
