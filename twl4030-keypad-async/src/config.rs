//! Keypad controller configuration.

use crate::err::ConfigError;
use crate::reg::tick_us;

/// Hardware limit of the switch matrix.
pub const MAX_ROWS: usize = 8;
/// Hardware limit of the switch matrix.
pub const MAX_COLS: usize = 8;
/// Highest value of the 3-bit prescaler field.
pub const MAX_PRESCALER: u8 = 7;

/// Settings used to program the controller. Fixed for the lifetime of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of matrix rows wired on the board (1-8).
    pub rows: u8,
    /// Number of matrix columns wired on the board (1-8).
    pub cols: u8,
    /// Clock prescaler (0-7) applied to every period register.
    pub prescaler: u8,
    /// Debounce period in microseconds.
    pub debounce_us: u32,
    /// Idle timeout period in microseconds.
    pub timeout_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: MAX_ROWS as u8,
            cols: MAX_COLS as u8,
            prescaler: 4,
            debounce_us: 20_000,
            timeout_us: 200_000,
        }
    }
}

impl Config {
    /// Creates a validated configuration for a `rows` x `cols` matrix with
    /// default timing.
    pub fn new(rows: u8, cols: u8) -> Result<Self, ConfigError> {
        let conf = Self {
            rows,
            cols,
            ..Self::default()
        };
        conf.validate()?;
        Ok(conf)
    }

    /// Sets the prescaler.
    pub fn with_prescaler(mut self, prescaler: u8) -> Self {
        self.prescaler = prescaler;
        self
    }

    /// Sets the debounce period.
    pub fn with_debounce_us(mut self, debounce_us: u32) -> Self {
        self.debounce_us = debounce_us;
        self
    }

    /// Sets the idle timeout period.
    pub fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Checks the matrix dimensions and prescaler against the hardware limits,
    /// and that both periods last at least one controller tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.rows as usize > MAX_ROWS {
            return Err(ConfigError::Rows(self.rows));
        }
        if self.cols == 0 || self.cols as usize > MAX_COLS {
            return Err(ConfigError::Cols(self.cols));
        }
        if self.prescaler > MAX_PRESCALER {
            return Err(ConfigError::Prescaler(self.prescaler));
        }
        let tick = tick_us(self.prescaler);
        if self.debounce_us < tick {
            return Err(ConfigError::Debounce(self.debounce_us));
        }
        if self.timeout_us < tick {
            return Err(ConfigError::Timeout(self.timeout_us));
        }
        Ok(())
    }
}
