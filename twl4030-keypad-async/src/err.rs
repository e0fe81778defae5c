//! Error types for the keypad driver.

use core::fmt::{self, Debug};

use embedded_regbus_async::BusError;

/// Configuration rejected before any bus activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Row count outside 1-8.
    Rows(u8),
    /// Column count outside 1-8.
    Cols(u8),
    /// Prescaler outside 0-7.
    Prescaler(u8),
    /// Debounce period, in microseconds, shorter than one controller tick.
    Debounce(u32),
    /// Timeout period, in microseconds, shorter than one controller tick.
    Timeout(u32),
}

/// Board keymap that cannot be turned into a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapError {
    /// Entry addresses a position outside the 8x8 matrix.
    OutOfRange {
        /// Row of the offending entry.
        row: u8,
        /// Column of the offending entry.
        col: u8,
    },
    /// More entries than matrix positions.
    Full,
}

/// The main error type for the keypad driver.
pub enum KeypadError<E> {
    /// A register read or write failed.
    Bus(BusError<E>),
    /// Invalid configuration.
    Config(ConfigError),
    /// Invalid board keymap.
    Keymap(KeymapError),
}

impl<E: Debug> Debug for KeypadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "Bus({err:?})"),
            Self::Config(err) => write!(f, "Config({err:?})"),
            Self::Keymap(err) => write!(f, "Keymap({err:?})"),
        }
    }
}

impl<E: PartialEq> PartialEq for KeypadError<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bus(a), Self::Bus(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::Keymap(a), Self::Keymap(b)) => a == b,
            _ => false,
        }
    }
}

impl<E> From<BusError<E>> for KeypadError<E> {
    fn from(err: BusError<E>) -> Self {
        KeypadError::Bus(err)
    }
}

impl<E> From<ConfigError> for KeypadError<E> {
    fn from(err: ConfigError) -> Self {
        KeypadError::Config(err)
    }
}

impl<E> From<KeymapError> for KeypadError<E> {
    fn from(err: KeymapError) -> Self {
        KeypadError::Keymap(err)
    }
}
