//! Matrix position to logical key mapping.
//!
//! Which key sits at which matrix position is board knowledge. Boards describe
//! it as a list of [`BoardKey`]s; [`build_keymap`] turns that list into the
//! [`Keymap`] the scan engine searches.

use heapless::{FnvIndexSet, Vec};

use crate::config::{MAX_COLS, MAX_ROWS};
use crate::err::KeymapError;

/// Row shift used to form scan codes for the 8x8 matrix.
pub const ROW_SHIFT: u8 = 3;

/// Number of matrix positions, and so the keymap capacity.
pub const KEYMAP_SIZE: usize = MAX_ROWS * MAX_COLS;

/// Reserved logical code; never reported as a key in use.
pub const KEY_RESERVED: u16 = 0;

/// Positional encoding of a matrix coordinate.
pub const fn matrix_scan_code(row: u8, col: u8, row_shift: u8) -> u16 {
    ((row as u16) << row_shift) + col as u16
}

/// A logical key, as returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// Logical key code.
    pub code: u16,
    /// The key is flagged persistent by the board.
    pub persistent: bool,
}

/// Board-level description of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardKey {
    /// Matrix row.
    pub row: u8,
    /// Matrix column.
    pub col: u8,
    /// Logical key code.
    pub code: u16,
    /// Persistent flag.
    pub persistent: bool,
}

impl BoardKey {
    /// A regular key at (`row`, `col`).
    pub const fn new(row: u8, col: u8, code: u16) -> Self {
        Self {
            row,
            col,
            code,
            persistent: false,
        }
    }

    /// A persistent key at (`row`, `col`).
    pub const fn persistent(row: u8, col: u8, code: u16) -> Self {
        Self {
            row,
            col,
            code,
            persistent: true,
        }
    }
}

/// One entry of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapEntry {
    pub row: u8,
    pub col: u8,
    pub scan_code: u16,
    pub key: Key,
}

/// Flat, ordered lookup table plus the set of logical codes it uses.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    entries: Vec<KeyMapEntry, KEYMAP_SIZE>,
    keys: FnvIndexSet<u16, KEYMAP_SIZE>,
    row_shift: u8,
}

impl Keymap {
    /// Entries in board order.
    pub fn entries(&self) -> &[KeyMapEntry] {
        &self.entries
    }

    /// Distinct logical codes in use, without [`KEY_RESERVED`].
    pub fn keys(&self) -> impl Iterator<Item = u16> + '_ {
        self.keys.iter().copied()
    }

    /// Returns `true` if `code` is mapped somewhere in the matrix.
    pub fn has_key(&self, code: u16) -> bool {
        self.keys.contains(&code)
    }

    /// Row shift the scan codes were built with.
    pub fn row_shift(&self) -> u8 {
        self.row_shift
    }

    /// Looks up the key at (`row`, `col`).
    ///
    /// Returns the first matching entry; `None` for positions no key is
    /// mapped to.
    pub fn find_key(&self, row: u8, col: u8) -> Option<Key> {
        self.entries
            .iter()
            .find(|entry| entry.row == row && entry.col == col)
            .map(|entry| entry.key)
    }
}

/// Builds the lookup table from the board description.
pub fn build_keymap(board: &[BoardKey], row_shift: u8) -> Result<Keymap, KeymapError> {
    let mut keymap = Keymap {
        row_shift,
        ..Keymap::default()
    };
    for bk in board {
        if bk.row as usize >= MAX_ROWS || bk.col as usize >= MAX_COLS {
            return Err(KeymapError::OutOfRange {
                row: bk.row,
                col: bk.col,
            });
        }
        let entry = KeyMapEntry {
            row: bk.row,
            col: bk.col,
            scan_code: matrix_scan_code(bk.row, bk.col, row_shift),
            key: Key {
                code: bk.code,
                persistent: bk.persistent,
            },
        };
        keymap.entries.push(entry).map_err(|_| KeymapError::Full)?;
        if bk.code != KEY_RESERVED {
            keymap.keys.insert(bk.code).map_err(|_| KeymapError::Full)?;
        }
    }
    Ok(keymap)
}
