//! Matrix state: reading, normalization, ghost detection and the shared
//! committed snapshot.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embedded_regbus_async::{BusError, RegisterBus};

use crate::config::{Config, MAX_ROWS};
use crate::reg::KEYP_FULL_CODE_7_0;

/// One column mask per row. Bits `0..cols` are keys, bit `cols` is the
/// overflow bit; rows past the configured count stay zero.
pub type MatrixState = [u16; MAX_ROWS];

/// Normalizes a raw column-status byte.
///
/// All columns reading active means the row line itself is grounded; that is
/// reported as the single overflow bit `1 << cols` instead of `cols` presses.
pub(crate) fn translate_column(raw: u8, cols: u8) -> u16 {
    if raw == 0xFF {
        1 << cols
    } else {
        raw as u16 & ((1 << cols) - 1)
    }
}

/// Reads every configured row in one transaction and normalizes it.
///
/// `conf` must have passed [`Config::validate`].
pub(crate) async fn read_matrix<B: RegisterBus>(
    bus: &mut B,
    conf: &Config,
) -> Result<MatrixState, BusError<B::Error>> {
    let rows = conf.rows as usize;
    let mut raw = [0u8; MAX_ROWS];
    bus.read(KEYP_FULL_CODE_7_0, &mut raw[..rows]).await?;

    let mut state = [0u16; MAX_ROWS];
    for (row, byte) in raw[..rows].iter().enumerate() {
        state[row] = translate_column(*byte, conf.cols);
    }
    Ok(state)
}

/// Returns `true` if the snapshot contains a pattern a diode-less matrix
/// cannot decode: a row with several keys down sharing a column with an
/// earlier row.
pub fn is_ghost(state: &MatrixState, rows: u8) -> bool {
    let mut check = 0u16;
    for &col in state.iter().take(rows as usize) {
        if (col & check) != 0 && col.count_ones() > 1 {
            return true;
        }
        check |= col;
    }
    false
}

/// Number of set bits over all rows, overflow bits included.
pub fn count_pressed(state: &MatrixState) -> u32 {
    state.iter().map(|row| row.count_ones()).sum()
}

/// The committed matrix, shared between the scanning task and observers.
///
/// A scan holds the lock from its bus read until its last commit, so
/// observers always see a state no scan is halfway through.
pub struct SharedMatrix<M: RawMutex> {
    state: Mutex<M, MatrixState>,
}

impl<M: RawMutex> SharedMatrix<M> {
    /// Creates an all-released matrix.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new([0; MAX_ROWS]),
        }
    }

    /// Counts the keys currently held down.
    ///
    /// Waits for an in-flight scan to finish; scanning resumes once the count
    /// has been taken.
    pub async fn pressed_count(&self) -> u32 {
        let state = self.state.lock().await;
        count_pressed(&state)
    }

    /// Returns a consistent copy of all rows.
    pub async fn snapshot(&self) -> MatrixState {
        *self.state.lock().await
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, M, MatrixState> {
        self.state.lock().await
    }
}

impl<M: RawMutex> Default for SharedMatrix<M> {
    fn default() -> Self {
        Self::new()
    }
}
