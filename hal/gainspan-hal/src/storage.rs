//! Non-volatile storage abstraction
//!
//! A flat byte-addressed store for small blobs such as saved network
//! parameters. Layout and meaning of the stored bytes belong to the caller;
//! the store only has to tell "never written" apart from "written".
//!
//! Written state is tracked separately from the data, so any value
//! (including `0xFF`, the erased level of NOR flash) round-trips. Flash
//! backends keep it in a [`written_map`]: one bit per data byte, erased
//! (`1`) until the byte is stored, so marking only ever clears bits.

use core::ops::Range;

/// Value of a byte that has never been written (erased NOR flash)
pub const ERASED_BYTE: u8 = 0xFF;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Part of the range has not been stored to since the last erase
    NotWritten,
    /// Address range lies outside the store
    OutOfRange,
    /// Underlying medium failed
    Io,
}

/// Non-volatile byte store
///
/// Implementations may be an internal flash partition, an external EEPROM,
/// or a file on an SD card.
pub trait NvStorage {
    /// Store `data` at `address`
    fn store(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError>;

    /// Read `buf.len()` bytes from `address`
    ///
    /// Returns [`StorageError::NotWritten`] unless every byte of the range
    /// has been stored to. `buf` is left untouched in that case.
    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError>;
}

/// Byte-granular written bitmap helpers
///
/// Data byte `i` is tracked by bit `i % 8` of map byte `i / 8`; a cleared
/// bit means written. Functions take a `window` of the map starting at map
/// byte `window_start` and only look at bits inside it, so callers can
/// walk a large map in small chunks.
pub mod written_map {
    use core::ops::Range;

    /// Map bytes needed to track `len` data bytes
    pub const fn map_len(len: usize) -> usize {
        len.div_ceil(8)
    }

    /// Map bytes covering the data byte range `range`
    pub fn span(range: &Range<usize>) -> Range<usize> {
        if range.is_empty() {
            return 0..0;
        }
        range.start / 8..map_len(range.end)
    }

    fn window_bits(window_start: usize, window_len: usize, range: &Range<usize>) -> Range<usize> {
        let first = range.start.max(window_start * 8);
        let last = range.end.min((window_start + window_len) * 8);
        first..last.max(first)
    }

    /// Mark every data byte of `range` that falls inside the window as written
    pub fn mark(window: &mut [u8], window_start: usize, range: &Range<usize>) {
        for bit in window_bits(window_start, window.len(), range) {
            window[bit / 8 - window_start] &= !(1 << (bit % 8));
        }
    }

    /// Whether every data byte of `range` inside the window is written
    pub fn all_marked(window: &[u8], window_start: usize, range: &Range<usize>) -> bool {
        window_bits(window_start, window.len(), range)
            .all(|bit| window[bit / 8 - window_start] & (1 << (bit % 8)) == 0)
    }
}

/// Store for platforms without non-volatile memory
///
/// Writes are rejected and every read reports [`StorageError::NotWritten`],
/// so callers fall back to their defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

impl NvStorage for NoStorage {
    fn store(&mut self, _address: u16, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Io)
    }

    fn read(&mut self, _address: u16, _buf: &mut [u8]) -> Result<(), StorageError> {
        Err(StorageError::NotWritten)
    }
}

/// RAM-backed store of `N` bytes
///
/// Starts fully erased. Useful on hosts and in tests; contents are lost at
/// reset.
#[derive(Debug, Clone)]
pub struct RamStorage<const N: usize> {
    cells: [u8; N],
    written: [bool; N],
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStorage<N> {
    /// Create an erased store
    pub const fn new() -> Self {
        Self {
            cells: [ERASED_BYTE; N],
            written: [false; N],
        }
    }

    /// Erase every cell
    pub fn erase_all(&mut self) {
        self.cells.fill(ERASED_BYTE);
        self.written.fill(false);
    }

    fn range(address: u16, len: usize) -> Result<Range<usize>, StorageError> {
        let start = address as usize;
        let end = start.checked_add(len).ok_or(StorageError::OutOfRange)?;
        if end > N {
            return Err(StorageError::OutOfRange);
        }
        Ok(start..end)
    }
}

impl<const N: usize> NvStorage for RamStorage<N> {
    fn store(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(address, data.len())?;
        self.cells[range.clone()].copy_from_slice(data);
        self.written[range].fill(true);
        Ok(())
    }

    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(address, buf.len())?;
        if !self.written[range.clone()].iter().all(|&w| w) {
            return Err(StorageError::NotWritten);
        }
        buf.copy_from_slice(&self.cells[range]);
        Ok(())
    }
}
