//! # Error Types
//!
//! Almost nothing in this crate fails: overflow degrades to truncation and a
//! missing console silences the logger. The two types below cover what is
//! left, an unknown parse-unit selector and a failing serial transport.

use core::fmt;

/// A raw parse-unit selector that is neither topic nor payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseUnitError {
    /// The selector value that was rejected.
    Invalid(u8),
}

impl fmt::Display for ParseUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseUnitError::Invalid(unit) => write!(f, "invalid parse unit: {}", unit),
        }
    }
}

/// Errors raised by [`SerialConsole`](crate::console::SerialConsole).
///
/// These never reach the [`Console`](crate::console::Console) surface; the
/// adapter turns a failed write into a detached console instead.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError<E> {
    /// The underlying byte stream reported an error.
    Transport(E),
    /// The console has been marked detached and refuses I/O.
    Detached,
}

impl<E> From<E> for ConsoleError<E>
where
    E: embedded_io_async::Error,
{
    fn from(err: E) -> Self {
        ConsoleError::Transport(err)
    }
}

impl<E: fmt::Debug> fmt::Display for ConsoleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Transport(e) => write!(f, "console transport error: {:?}", e),
            ConsoleError::Detached => f.write_str("console detached"),
        }
    }
}
