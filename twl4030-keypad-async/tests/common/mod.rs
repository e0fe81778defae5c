#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embassy_futures::yield_now;
use embedded_hal::digital::{ErrorKind, ErrorType};
use embedded_hal_async::digital::Wait;
use embedded_regbus_async::{BusError, RegisterBus};
use twl4030_keypad_async::reg::{KEYP_FULL_CODE_7_0, KEYP_ISR1};
use twl4030_keypad_async::{EventSink, ScanEvent};

/// Transport error of the fake bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nak;

#[derive(Default)]
pub struct Regs {
    pub regs: [u8; 0x18],
    /// Every write attempt, failed ones included.
    pub writes: Vec<(u8, u8)>,
    /// Every read attempt as (register, length).
    pub reads: Vec<(u8, usize)>,
    pub fail_write_to: Option<u8>,
    pub fail_read_of: Option<u8>,
}

/// In-memory keypad register block. ISR1 clears on read.
#[derive(Clone, Default)]
pub struct RegisterFile {
    pub state: Rc<RefCell<Regs>>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rows(&self, rows: &[u8]) {
        let base = KEYP_FULL_CODE_7_0 as usize;
        self.state.borrow_mut().regs[base..base + rows.len()].copy_from_slice(rows);
    }

    pub fn set_status(&self, status: u8) {
        self.state.borrow_mut().regs[KEYP_ISR1 as usize] = status;
    }

    pub fn reg(&self, register: u8) -> u8 {
        self.state.borrow().regs[register as usize]
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state.borrow().writes.clone()
    }

    pub fn reads(&self) -> Vec<(u8, usize)> {
        self.state.borrow().reads.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.writes.clear();
        state.reads.clear();
    }

    pub fn fail_write_to(&self, register: Option<u8>) {
        self.state.borrow_mut().fail_write_to = register;
    }

    pub fn fail_read_of(&self, register: Option<u8>) {
        self.state.borrow_mut().fail_read_of = register;
    }
}

impl RegisterBus for RegisterFile {
    type Error = Nak;

    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError<Nak>> {
        let mut state = self.state.borrow_mut();
        state.reads.push((register, buf.len()));
        if state.fail_read_of == Some(register) {
            return Err(BusError::Read {
                register,
                source: Nak,
            });
        }
        let start = register as usize;
        buf.copy_from_slice(&state.regs[start..start + buf.len()]);
        if register == KEYP_ISR1 {
            state.regs[KEYP_ISR1 as usize] = 0;
        }
        Ok(())
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<Nak>> {
        let mut state = self.state.borrow_mut();
        state.writes.push((register, value));
        if state.fail_write_to == Some(register) {
            return Err(BusError::Write {
                register,
                source: Nak,
            });
        }
        state.regs[register as usize] = value;
        Ok(())
    }
}

/// Records sink calls.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<ScanEvent>,
    pub syncs: usize,
}

impl Recorder {
    /// (row, col, pressed) of every reported event.
    pub fn transitions(&self) -> Vec<(u8, u8, bool)> {
        self.events
            .iter()
            .map(|e| (e.row, e.col, e.pressed))
            .collect()
    }
}

impl EventSink for Recorder {
    async fn report(&mut self, event: &ScanEvent) {
        self.events.push(*event);
    }

    async fn sync(&mut self) {
        self.syncs += 1;
    }
}

/// Suspends once before every matrix read, like a real bus would while the
/// transfer is in progress.
#[derive(Clone)]
pub struct YieldingBus {
    pub inner: RegisterFile,
}

impl YieldingBus {
    pub fn new(inner: RegisterFile) -> Self {
        Self { inner }
    }
}

impl RegisterBus for YieldingBus {
    type Error = Nak;

    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError<Nak>> {
        if register == KEYP_FULL_CODE_7_0 {
            yield_now().await;
        }
        self.inner.read(register, buf).await
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<Nak>> {
        self.inner.write(register, value).await
    }
}

/// Interrupt line that is asserted `remaining` times, then fails.
pub struct IrqLine {
    pub remaining: usize,
    pub waits: usize,
}

impl IrqLine {
    pub fn asserted(times: usize) -> Self {
        Self {
            remaining: times,
            waits: 0,
        }
    }

    fn next(&mut self) -> Result<(), ErrorKind> {
        self.waits += 1;
        if self.remaining == 0 {
            return Err(ErrorKind::Other);
        }
        self.remaining -= 1;
        Ok(())
    }
}

impl ErrorType for IrqLine {
    type Error = ErrorKind;
}

impl Wait for IrqLine {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.next()
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.next()
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.next()
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.next()
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.next()
    }
}
