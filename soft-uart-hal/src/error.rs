use core::fmt;

/// Error type for software UART operations.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The baud rate is zero, or so high that one bit rounds down to zero microseconds.
    InvalidBaudRate,
    /// Bad argument: a buffer size below 2 or larger than the backing storage.
    BadArgument,
    /// A GPIO operation on the RX or TX pin failed.
    Pin(embedded_hal::digital::ErrorKind),
}

impl Error {
    pub(crate) fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        Error::Pin(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBaudRate => f.write_str("invalid baud rate"),
            Error::BadArgument => f.write_str("bad argument"),
            Error::Pin(kind) => write!(f, "pin error: {}", kind),
        }
    }
}

impl embedded_hal_nb::serial::Error for Error {
    fn kind(&self) -> embedded_hal_nb::serial::ErrorKind {
        embedded_hal_nb::serial::ErrorKind::Other
    }
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::InvalidBaudRate | Error::BadArgument => embedded_io::ErrorKind::InvalidInput,
            Error::Pin(_) => embedded_io::ErrorKind::Other,
        }
    }
}
