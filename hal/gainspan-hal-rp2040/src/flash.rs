//! Flash-backed non-volatile storage for RP2040
//!
//! The last 64KB of flash hold a flat byte store addressed by a `u16`
//! offset. The first 56KB are data; the last two sectors hold the written
//! map (one bit per data byte, see [`gainspan_hal::storage::written_map`]),
//! so stored `0xFF` bytes are told apart from erased flash.
//!
//! Stores are done sector by sector as read-modify-erase-write: data first,
//! then the map. A store interrupted in between reads back as never
//! written.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use gainspan_hal::storage::{written_map, ERASED_BYTE};
use gainspan_hal::{NvStorage, StorageError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on common boards
pub const STORAGE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORAGE_PARTITION_START: usize = FLASH_SIZE - STORAGE_PARTITION_SIZE;

/// Addressable data bytes (14 sectors)
pub const DATA_SIZE: usize = 14 * ERASE_SIZE;
/// Written map, right after the data area
pub const MAP_START: usize = STORAGE_PARTITION_START + DATA_SIZE;
pub const MAP_SIZE: usize = written_map::map_len(DATA_SIZE);

const _: () = assert!(DATA_SIZE + MAP_SIZE <= STORAGE_PARTITION_SIZE);

/// Map bytes handled per flash access
const MAP_CHUNK: usize = 64;

/// RP2040 flash storage
pub struct FlashStorage<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    sector: [u8; ERASE_SIZE],
}

impl<'d> FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            sector: [ERASED_BYTE; ERASE_SIZE],
        }
    }

    /// Erase the whole storage partition, data and map
    pub fn erase_all(&mut self) -> Result<(), StorageError> {
        self.flash
            .blocking_erase(STORAGE_PARTITION_START as u32, FLASH_SIZE as u32)
            .map_err(|_| StorageError::Io)
    }

    fn data_range(address: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = address as usize;
        let end = start + len;
        if end > DATA_SIZE {
            return Err(StorageError::OutOfRange);
        }
        Ok(start..end)
    }

    /// Rewrite one sector with `data` placed at `offset` inside it
    fn write_sector(
        &mut self,
        sector_start: u32,
        offset: usize,
        data: &[u8],
    ) -> Result<(), StorageError> {
        self.flash
            .blocking_read(sector_start, &mut self.sector)
            .map_err(|_| StorageError::Io)?;

        if self.sector[offset..offset + data.len()] == *data {
            return Ok(());
        }
        self.sector[offset..offset + data.len()].copy_from_slice(data);

        self.flash
            .blocking_erase(sector_start, sector_start + ERASE_SIZE as u32)
            .map_err(|_| StorageError::Io)?;
        self.flash
            .blocking_write(sector_start, &self.sector)
            .map_err(|_| StorageError::Io)
    }

    /// Write `data` at absolute flash offset `pos`, across sectors
    fn write_at(&mut self, mut pos: usize, data: &[u8]) -> Result<(), StorageError> {
        let mut remaining = data;
        while !remaining.is_empty() {
            let sector_start = pos - pos % ERASE_SIZE;
            let offset = pos - sector_start;
            let chunk = remaining.len().min(ERASE_SIZE - offset);

            self.write_sector(sector_start as u32, offset, &remaining[..chunk])?;

            pos += chunk;
            remaining = &remaining[chunk..];
        }
        Ok(())
    }

    fn read_map(&mut self, map_byte: usize, window: &mut [u8]) -> Result<(), StorageError> {
        self.flash
            .blocking_read((MAP_START + map_byte) as u32, window)
            .map_err(|_| StorageError::Io)
    }

    fn mark_written(&mut self, range: &core::ops::Range<usize>) -> Result<(), StorageError> {
        let span = written_map::span(range);
        let mut window = [ERASED_BYTE; MAP_CHUNK];
        let mut map_byte = span.start;
        while map_byte < span.end {
            let n = (span.end - map_byte).min(MAP_CHUNK);
            self.read_map(map_byte, &mut window[..n])?;
            written_map::mark(&mut window[..n], map_byte, range);
            self.write_at(MAP_START + map_byte, &window[..n])?;
            map_byte += n;
        }
        Ok(())
    }

    fn is_written(&mut self, range: &core::ops::Range<usize>) -> Result<bool, StorageError> {
        let span = written_map::span(range);
        let mut window = [ERASED_BYTE; MAP_CHUNK];
        let mut map_byte = span.start;
        while map_byte < span.end {
            let n = (span.end - map_byte).min(MAP_CHUNK);
            self.read_map(map_byte, &mut window[..n])?;
            if !written_map::all_marked(&window[..n], map_byte, range) {
                return Ok(false);
            }
            map_byte += n;
        }
        Ok(true)
    }
}

impl NvStorage for FlashStorage<'_> {
    fn store(&mut self, address: u16, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::data_range(address, data.len())?;

        self.write_at(STORAGE_PARTITION_START + range.start, data)?;
        self.mark_written(&range)?;

        defmt::debug!("Stored {=usize} bytes at {=u16:#x}", data.len(), address);
        Ok(())
    }

    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::data_range(address, buf.len())?;

        if !self.is_written(&range)? {
            return Err(StorageError::NotWritten);
        }
        self.flash
            .blocking_read((STORAGE_PARTITION_START + range.start) as u32, buf)
            .map_err(|_| StorageError::Io)
    }
}
