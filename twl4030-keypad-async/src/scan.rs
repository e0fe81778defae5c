//! Scan engine: turns matrix transitions into key events.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embedded_regbus_async::{BusError, RegisterBus};
use heapless::Vec;

use crate::config::{Config, MAX_ROWS};
use crate::keymap::{matrix_scan_code, Key, Keymap, KEYMAP_SIZE};
use crate::matrix::{is_ghost, read_matrix, MatrixState};

/// A single key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEvent {
    /// Matrix row.
    pub row: u8,
    /// Matrix column.
    pub col: u8,
    /// Positional code of (`row`, `col`).
    pub scan_code: u16,
    /// Logical key, `None` if no key is mapped at this position.
    pub key: Option<Key>,
    /// `true` for a press, `false` for a release.
    pub pressed: bool,
}

/// Consumer of decoded key events.
///
/// Every scan that gets past reading and ghost checks reports its transitions
/// and then calls [`EventSink::sync`] once, even if nothing changed. Both calls
/// may wait; a batch is never truncated.
///
/// Events are delivered after the scan has committed and released the matrix,
/// so a sink may query the [`SharedMatrix`](crate::matrix::SharedMatrix).
#[allow(async_fn_in_trait)]
pub trait EventSink {
    /// Called once per transition, rows and columns ascending.
    async fn report(&mut self, event: &ScanEvent);

    /// Marks the end of one scan's batch.
    async fn sync(&mut self);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    async fn report(&mut self, event: &ScanEvent) {
        S::report(self, event).await
    }

    async fn sync(&mut self) {
        S::sync(self).await
    }
}

/// Message form of the sink calls, for handing events to another task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadEvent {
    /// A key transition.
    Key(ScanEvent),
    /// End of a scan's batch.
    Sync,
}

/// Waits for room in the channel when it is full.
impl<M: RawMutex, const N: usize> EventSink for Sender<'_, M, KeypadEvent, N> {
    async fn report(&mut self, event: &ScanEvent) {
        self.send(KeypadEvent::Key(*event)).await
    }

    async fn sync(&mut self) {
        self.send(KeypadEvent::Sync).await
    }
}

/// What a scan did with the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The candidate was committed after reporting `events` transitions.
    Committed {
        /// Number of reported transitions.
        events: usize,
    },
    /// The reading was ambiguous and thrown away.
    Ghost,
}

/// Transitions of one committed scan, in report order.
pub(crate) type Batch = Vec<ScanEvent, KEYMAP_SIZE>;

/// Scans the matrix once and collects every transition against `previous`
/// into `batch`.
///
/// With `release_all` the candidate is an empty matrix and the bus is not
/// touched. A failed read or a ghosted reading leaves `previous` as it was
/// and collects nothing. `conf` must have passed [`Config::validate`].
pub(crate) async fn scan<B: RegisterBus>(
    bus: &mut B,
    conf: &Config,
    keymap: &Keymap,
    previous: &mut MatrixState,
    batch: &mut Batch,
    release_all: bool,
) -> Result<ScanOutcome, BusError<B::Error>> {
    let candidate = if release_all {
        [0u16; MAX_ROWS]
    } else {
        let candidate = read_matrix(bus, conf).await?;
        if is_ghost(&candidate, conf.rows) {
            log::debug!("keypad: ghost state {:?}, ignored", &candidate[..conf.rows as usize]);
            return Ok(ScanOutcome::Ghost);
        }
        candidate
    };

    for row in 0..conf.rows {
        let new = candidate[row as usize];
        let changed = new ^ previous[row as usize];
        if changed == 0 {
            continue;
        }

        // The overflow bit is committed but never reported.
        for col in 0..conf.cols {
            if changed & (1 << col) == 0 {
                continue;
            }
            let pressed = new & (1 << col) != 0;
            log::debug!(
                "key [{row}:{col}] {}",
                if pressed { "press" } else { "release" }
            );
            // At most rows * cols <= KEYMAP_SIZE transitions per scan.
            let _ = batch.push(ScanEvent {
                row,
                col,
                scan_code: matrix_scan_code(row, col, keymap.row_shift()),
                key: keymap.find_key(row, col),
                pressed,
            });
        }
        previous[row as usize] = new;
    }

    Ok(ScanOutcome::Committed {
        events: batch.len(),
    })
}

/// Hands a committed batch to `sink`, followed by one `sync`.
pub(crate) async fn deliver<S: EventSink + ?Sized>(batch: &[ScanEvent], sink: &mut S) {
    for event in batch {
        sink.report(event).await;
    }
    sink.sync().await;
}
