//! Register map and programming protocol of the keypad controller.

use embedded_regbus_async::{BusError, RegisterBus};

use crate::config::Config;

// --- Register Offsets ---
pub const KEYP_CTRL: u8 = 0x00;
pub const KEYP_DEB: u8 = 0x01;
pub const KEYP_LONG_KEY: u8 = 0x02;
pub const KEYP_LK_PTV: u8 = 0x03;
pub const KEYP_TIMEOUT_L: u8 = 0x04;
pub const KEYP_TIMEOUT_H: u8 = 0x05;
pub const KEYP_KBC: u8 = 0x06;
pub const KEYP_KBR: u8 = 0x07;
pub const KEYP_SMS: u8 = 0x08;
/// Row 0 column status; rows 1..7 follow at consecutive offsets.
pub const KEYP_FULL_CODE_7_0: u8 = 0x09;
pub const KEYP_FULL_CODE_63_56: u8 = 0x10;
pub const KEYP_ISR1: u8 = 0x11;
pub const KEYP_IMR1: u8 = 0x12;
pub const KEYP_ISR2: u8 = 0x13;
pub const KEYP_IMR2: u8 = 0x14;
pub const KEYP_SIR: u8 = 0x15;
/// Edge triggers.
pub const KEYP_EDR: u8 = 0x16;
pub const KEYP_SIH_CTRL: u8 = 0x17;

// --- KEYP_CTRL Fields ---
pub const CTRL_SOFT_NRST: u8 = 1 << 0;
pub const CTRL_SOFTMODEN: u8 = 1 << 1;
pub const CTRL_LK_EN: u8 = 1 << 2;
pub const CTRL_TOE_EN: u8 = 1 << 3;
pub const CTRL_TOLE_EN: u8 = 1 << 4;
pub const CTRL_RP_EN: u8 = 1 << 5;
pub const CTRL_KBD_ON: u8 = 1 << 6;

// --- KEYP_LK_PTV Fields ---
pub const LK_PTV_PTV_SHIFT: u8 = 5;

// --- KEYP_ISR1 / KEYP_IMR1 Fields ---
pub const IMR1_KP: u8 = 1 << 0;
pub const IMR1_LK: u8 = 1 << 1;
pub const IMR1_TO: u8 = 1 << 2;
pub const IMR1_MIS: u8 = 1 << 3;

// --- KEYP_EDR Fields ---
pub const EDR_KP_FALLING: u8 = 0x01;
pub const EDR_KP_RISING: u8 = 0x02;
pub const EDR_KP_BOTH: u8 = 0x03;
pub const EDR_LK_FALLING: u8 = 0x04;
pub const EDR_LK_RISING: u8 = 0x08;
pub const EDR_TO_FALLING: u8 = 0x10;
pub const EDR_TO_RISING: u8 = 0x20;
pub const EDR_MIS_FALLING: u8 = 0x40;
pub const EDR_MIS_RISING: u8 = 0x80;

// --- KEYP_SIH_CTRL Fields ---
pub const SIH_CTRL_EXCLEN: u8 = 1 << 0;
pub const SIH_CTRL_PENDDIS: u8 = 1 << 1;
pub const SIH_CTRL_COR: u8 = 1 << 2;

/// Control word written first: out of reset, software decoding, idle
/// timeout enabled, keypad scanning on. Long-key and autorepeat stay off.
pub const CTRL_INIT: u8 = CTRL_SOFT_NRST | CTRL_SOFTMODEN | CTRL_TOE_EN | CTRL_KBD_ON;

/// Key-press on both edges, timeout on the rising edge.
pub const EDR_INIT: u8 = EDR_KP_BOTH | EDR_TO_RISING;

/// Clear-on-read; events between assertion and acknowledge are not latched again.
pub const SIH_CTRL_INIT: u8 = SIH_CTRL_COR | SIH_CTRL_PENDDIS;

/// IMR1 value unmasking the key-press and timeout sources (a set bit masks).
pub const IMR1_ENABLE: u8 = !(IMR1_KP | IMR1_TO);

/// IMR1 value masking every source.
pub const IMR1_MASK_ALL: u8 = 0xFF;

/// Converts a period in microseconds into controller ticks for the given
/// prescaler, as used by the debounce, long-key and timeout registers.
///
/// Periods shorter than one tick wrap to all ones, the longest period the
/// registers hold. [`Config::validate`] rejects such periods.
pub(crate) const fn period_ticks(us: u32, prescaler: u8) -> u32 {
    (us / tick_us(prescaler)).wrapping_sub(1)
}

/// Length of one controller tick in microseconds.
pub(crate) const fn tick_us(prescaler: u8) -> u32 {
    31 << (prescaler as u32 + 1)
}

/// Decoded contents of the ISR1 status register.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct InterruptStatus {
    inner: u8,
}

impl From<u8> for InterruptStatus {
    fn from(status: u8) -> Self {
        Self { inner: status }
    }
}

impl From<InterruptStatus> for u8 {
    fn from(val: InterruptStatus) -> Self {
        val.inner
    }
}

impl core::fmt::Debug for InterruptStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptStatus")
            .field("key_press", &self.key_press())
            .field("long_key", &self.long_key())
            .field("timeout", &self.timeout())
            .field("multi_interrupt", &self.multi_interrupt())
            .finish()
    }
}

impl InterruptStatus {
    /// Returns `true` if a key-press transition is pending.
    pub fn key_press(self) -> bool {
        (self.inner & IMR1_KP) > 0
    }

    /// Returns `true` if a long-key event is pending.
    pub fn long_key(self) -> bool {
        (self.inner & IMR1_LK) > 0
    }

    /// Returns `true` if the idle timeout expired.
    pub fn timeout(self) -> bool {
        (self.inner & IMR1_TO) > 0
    }

    /// Returns `true` if the multi-interrupt status bit is set.
    pub fn multi_interrupt(self) -> bool {
        (self.inner & IMR1_MIS) > 0
    }
}

/// Register writes of the programming sequence, in the order they are issued.
///
/// The timeout period is split into its low and high byte; only the low byte
/// of the debounce period fits its register.
pub(crate) fn init_sequence(conf: &Config) -> [(u8, u8); 7] {
    let debounce = period_ticks(conf.debounce_us, conf.prescaler);
    let timeout = period_ticks(conf.timeout_us, conf.prescaler);
    [
        (KEYP_CTRL, CTRL_INIT),
        (KEYP_EDR, EDR_INIT),
        (KEYP_LK_PTV, conf.prescaler << LK_PTV_PTV_SHIFT),
        (KEYP_DEB, (debounce & 0xFF) as u8),
        (KEYP_TIMEOUT_L, (timeout & 0xFF) as u8),
        (KEYP_TIMEOUT_H, ((timeout >> 8) & 0xFF) as u8),
        (KEYP_SIH_CTRL, SIH_CTRL_INIT),
    ]
}

/// Programs control, timing and interrupt-behaviour registers.
///
/// Stops at the first failed write; nothing after it is written.
pub(crate) async fn program<B: RegisterBus>(bus: &mut B, conf: &Config) -> Result<(), BusError<B::Error>> {
    for (register, value) in init_sequence(conf) {
        log::trace!("keypad::program {register:#04x} = {value:#04x}");
        bus.write(register, value).await?;
    }
    Ok(())
}
