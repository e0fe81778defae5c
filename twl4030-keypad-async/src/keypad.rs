//! Driver instance: initialization, interrupt dispatch and the service loop.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use embedded_regbus_async::{BusError, I2cRegisterBus, RegisterBus};

use crate::config::Config;
use crate::err::KeypadError;
use crate::keymap::{build_keymap, BoardKey, Keymap, ROW_SHIFT};
use crate::matrix::{read_matrix, SharedMatrix};
use crate::reg::{self, InterruptStatus, IMR1_ENABLE, IMR1_MASK_ALL, KEYP_IMR1, KEYP_ISR1};
use crate::scan::{self, Batch, EventSink, ScanOutcome};

/// I2C address of the companion chip's keypad module.
pub const KEYPAD_I2C_ADDRESS: SevenBitAddress = 0x4A;
/// Offset of the keypad register block inside that address space.
pub const KEYPAD_REG_BASE: u8 = 0xD2;

/// Register bus for the keypad block of a TWL4030-family chip on `i2c`.
pub fn keypad_bus<I2cType, ErrorType>(i2c: I2cType) -> I2cRegisterBus<I2cType, ErrorType>
where
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
    ErrorType: embedded_hal_async::i2c::Error,
{
    I2cRegisterBus::new(i2c, KEYPAD_I2C_ADDRESS).with_base(KEYPAD_REG_BASE)
}

/// Which scan an interrupt led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Key-press status was set; the matrix was read and diffed.
    Scanned,
    /// Status was unreadable or reported something else; every key held
    /// down was released.
    Released,
}

/// A keypad controller driver instance.
///
/// Owns the bus, the configuration and the keymap. The committed matrix lives
/// in a [`SharedMatrix`] so other tasks can query it while this driver sits in
/// its service loop.
pub struct Keypad<'a, B: RegisterBus, M: RawMutex> {
    bus: B,
    conf: Config,
    keymap: Keymap,
    matrix: &'a SharedMatrix<M>,
}

impl<'a, B: RegisterBus, M: RawMutex> Keypad<'a, B, M> {
    /// Creates a new `Keypad`.
    ///
    /// The configuration is validated here, before the bus is ever used.
    ///
    /// # Arguments
    ///
    /// * `bus` - Register access to the keypad block.
    /// * `conf` - Matrix dimensions and timing.
    /// * `keymap` - Lookup table built with [`crate::keymap::build_keymap`].
    /// * `matrix` - Storage for the committed matrix state.
    pub fn new(
        bus: B,
        conf: Config,
        keymap: Keymap,
        matrix: &'a SharedMatrix<M>,
    ) -> Result<Self, KeypadError<B::Error>> {
        conf.validate()?;
        Ok(Self {
            bus,
            conf,
            keymap,
            matrix,
        })
    }

    /// Creates a new `Keypad` with a keymap built from the board description.
    pub fn from_board(
        bus: B,
        conf: Config,
        board: &[BoardKey],
        matrix: &'a SharedMatrix<M>,
    ) -> Result<Self, KeypadError<B::Error>> {
        conf.validate()?;
        let keymap = build_keymap(board, ROW_SHIFT)?;
        Self::new(bus, conf, keymap, matrix)
    }

    /// The configuration the controller is programmed with.
    pub fn config(&self) -> &Config {
        &self.conf
    }

    /// The lookup table used for reported events.
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// The committed matrix.
    pub fn matrix(&self) -> &'a SharedMatrix<M> {
        self.matrix
    }

    /// Releases the register bus.
    pub fn release(self) -> B {
        self.bus
    }

    /// Programs the controller and unmasks its key-press and timeout
    /// interrupts.
    ///
    /// If unmasking fails, all sources are masked again (best effort) and the
    /// error is returned.
    pub async fn init(&mut self) -> Result<(), KeypadError<B::Error>> {
        self.program().await?;

        if let Err(err) = self.bus.write(KEYP_IMR1, IMR1_ENABLE).await {
            log::warn!("Error unmasking keypad interrupts: {err:?}");
            let _ = self.bus.write(KEYP_IMR1, IMR1_MASK_ALL).await;
            return Err(err.into());
        }

        log::info!(
            "Keypad controller initialized ({}x{}).",
            self.conf.rows,
            self.conf.cols
        );
        Ok(())
    }

    /// Writes the configuration registers and seeds the committed matrix
    /// with what is held down right now. Interrupts stay masked.
    pub async fn program(&mut self) -> Result<(), KeypadError<B::Error>> {
        reg::program(&mut self.bus, &self.conf).await?;

        let matrix = self.matrix;
        let mut previous = matrix.lock().await;
        *previous = read_matrix(&mut self.bus, &self.conf).await?;
        log::trace!("keypad::program baseline {:?}", &previous[..self.conf.rows as usize]);
        Ok(())
    }

    /// Masks every keypad interrupt source.
    pub async fn mask_interrupts(&mut self) -> Result<(), KeypadError<B::Error>> {
        self.bus.write(KEYP_IMR1, IMR1_MASK_ALL).await?;
        Ok(())
    }

    /// Reads and clears the interrupt status.
    pub async fn read_status(&mut self) -> Result<InterruptStatus, BusError<B::Error>> {
        self.bus.read_u8(KEYP_ISR1).await.map(InterruptStatus::from)
    }

    /// Runs one scan against the committed matrix.
    ///
    /// The matrix stays locked from the bus read until the last commit. The
    /// committed transitions are handed to `sink` once the lock is released.
    pub async fn scan<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        release_all: bool,
    ) -> Result<ScanOutcome, KeypadError<B::Error>> {
        let mut batch = Batch::new();
        let outcome = {
            let matrix = self.matrix;
            let mut previous = matrix.lock().await;
            scan::scan(
                &mut self.bus,
                &self.conf,
                &self.keymap,
                &mut *previous,
                &mut batch,
                release_all,
            )
            .await?
        };
        if let ScanOutcome::Committed { .. } = outcome {
            scan::deliver(&batch, sink).await;
        }
        Ok(outcome)
    }

    /// Handles one keypad interrupt.
    ///
    /// Reading the status acknowledges the interrupt. A key-press status
    /// leads to a normal scan; a failed read or any other status releases
    /// every key. Bus errors are logged, never returned.
    pub async fn dispatch<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Dispatch {
        let dispatch = match self.read_status().await {
            Ok(status) if status.key_press() => Dispatch::Scanned,
            Ok(status) => {
                log::debug!("keypad: {status:?}, releasing all keys");
                Dispatch::Released
            }
            Err(err) => {
                log::warn!("Error reading keypad status, releasing all keys: {err:?}");
                Dispatch::Released
            }
        };

        let release_all = dispatch == Dispatch::Released;
        if let Err(err) = self.scan(sink, release_all).await {
            log::warn!("Keypad scan failed: {err:?}");
        }
        dispatch
    }

    /// Waits for the interrupt line to go low, then dispatches.
    pub async fn wait_and_dispatch<P: Wait, S: EventSink + ?Sized>(
        &mut self,
        irq: &mut P,
        sink: &mut S,
    ) -> Result<Dispatch, P::Error> {
        irq.wait_for_low().await?;
        Ok(self.dispatch(sink).await)
    }

    /// Services interrupts forever. Returns only if the interrupt pin fails.
    pub async fn run<P: Wait, S: EventSink + ?Sized>(&mut self, irq: &mut P, sink: &mut S) -> P::Error {
        loop {
            if let Err(err) = self.wait_and_dispatch(irq, sink).await {
                log::warn!("Error waiting for keypad interrupt: {err:?}");
                return err;
            }
        }
    }
}
