//! An asynchronous, `no_std` driver for the keypad controller of TWL4030-family
//! companion chips.
//!
//! The controller scans an up to 8x8 switch matrix and exposes one column
//! status byte per row over I2C. This driver programs the controller's timing
//! and interrupt behaviour, and on every keypad interrupt diffs the matrix
//! against the last committed state, discards ghosted readings and reports
//! press/release events through an [`scan::EventSink`].
//!
//! # Usage
//!
//! The driver needs a [`embedded_regbus_async::RegisterBus`] for the keypad
//! block (see [`keypad::keypad_bus`] for the I2C one), a keymap, and an
//! interrupt line implementing `embedded-hal-async::digital::Wait`.
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use embassy_sync::channel::Channel;
//! use twl4030_keypad_async::config::Config;
//! use twl4030_keypad_async::keymap::{build_keymap, BoardKey, ROW_SHIFT};
//! use twl4030_keypad_async::keypad::{keypad_bus, Keypad};
//! use twl4030_keypad_async::matrix::SharedMatrix;
//! use twl4030_keypad_async::scan::KeypadEvent;
//!
//! static MATRIX: SharedMatrix<CriticalSectionRawMutex> = SharedMatrix::new();
//! static EVENTS: Channel<CriticalSectionRawMutex, KeypadEvent, 16> = Channel::new();
//!
//! const BOARD: &[BoardKey] = &[BoardKey::new(0, 0, 30), BoardKey::new(0, 1, 48)];
//!
//! #[embassy_executor::task]
//! async fn keypad_task(i2c: I2c<'static, Async>, mut irq: Input<'static>) {
//!     let keymap = build_keymap(BOARD, ROW_SHIFT).unwrap();
//!     let mut keypad = Keypad::new(keypad_bus(i2c), Config::default(), keymap, &MATRIX).unwrap();
//!     keypad.init().await.unwrap();
//!
//!     let mut sink = EVENTS.sender();
//!     let err = keypad.run(&mut irq, &mut sink).await;
//!     log::error!("Keypad interrupt line failed: {err:?}");
//! }
//! ```

#![no_std]

pub mod config;
pub mod err;
pub mod keymap;
pub mod keypad;
pub mod matrix;
pub mod reg;
pub mod scan;

pub use config::Config;
pub use err::{ConfigError, KeymapError, KeypadError};
pub use keypad::{Dispatch, Keypad};
pub use matrix::SharedMatrix;
pub use scan::{EventSink, KeypadEvent, ScanEvent, ScanOutcome};
