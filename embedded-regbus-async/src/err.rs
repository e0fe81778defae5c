//! Error type for register transactions.

use core::fmt::{self, Debug};

/// A failed register transaction, tagged with the register it targeted.
#[derive(Clone, PartialEq, Eq)]
pub enum BusError<E> {
    /// A read starting at `register` failed.
    Read {
        /// First register of the read.
        register: u8,
        /// The transport error.
        source: E,
    },
    /// A write to `register` failed.
    Write {
        /// Target register.
        register: u8,
        /// The transport error.
        source: E,
    },
}

impl<E> BusError<E> {
    /// The register the failed transaction addressed.
    pub fn register(&self) -> u8 {
        match self {
            Self::Read { register, .. } | Self::Write { register, .. } => *register,
        }
    }

    /// Returns the underlying transport error.
    pub fn into_source(self) -> E {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => source,
        }
    }
}

impl<E: Debug> Debug for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { register, source } => write!(f, "Read({register:#04x}, {source:?})"),
            Self::Write { register, source } => write!(f, "Write({register:#04x}, {source:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_source_are_recoverable() {
        let err: BusError<u8> = BusError::Write {
            register: 0x12,
            source: 7,
        };
        assert_eq!(err.register(), 0x12);
        assert_eq!(err.clone().into_source(), 7);
        assert_ne!(
            err,
            BusError::Read {
                register: 0x12,
                source: 7
            }
        );
    }
}
