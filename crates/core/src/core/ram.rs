//! The flat backing store behind the cache.
//!
//! Grounded on `original_source/simulate.hpp`'s `RAM` class: a
//! `MEM_SIZE`-byte array, zero-initialized then overlaid with the image's
//! fragments, with whole-line read/write used by the cache controller on
//! miss and eviction. Unlike the teacher's `bus`-mediated RAM (behind an
//! MMIO-aware system interconnect), this system has nothing but RAM at
//! every address, so the type is a thin `Vec<u8>` wrapper.

use crate::common::constants::{LINE_BYTES, MEM_SIZE};
use crate::common::MemoryError;
use crate::sim::image::Fragment;

/// The simulator's single `MEM_SIZE`-byte memory region.
pub struct Ram {
    bytes: Vec<u8>,
}

impl Ram {
    /// Builds a zero-initialized RAM with no fragments loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEM_SIZE],
        }
    }

    /// Builds RAM from a fragment list, written in load order as spec.md §3
    /// requires (later fragments win on overlap, matching `original_source`,
    /// which has no overlap detection).
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if any fragment's `[base, base +
    /// len)` range falls outside the address space.
    pub fn from_fragments(fragments: &[Fragment]) -> Result<Self, MemoryError> {
        let mut ram = Self::new();
        for frag in fragments {
            ram.write_bytes(frag.base, &frag.bytes)?;
        }
        Ok(ram)
    }

    /// Reads one 64-byte, line-aligned chunk starting at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `[addr, addr + LINE_BYTES)`
    /// exceeds the address space.
    pub fn read_line(&self, addr: u32) -> Result<[u8; LINE_BYTES], MemoryError> {
        let start = addr as usize;
        let end = start + LINE_BYTES;
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfRange {
                addr,
                width: LINE_BYTES as u32,
                limit: MEM_SIZE,
            });
        }
        let mut line = [0u8; LINE_BYTES];
        line.copy_from_slice(&self.bytes[start..end]);
        Ok(line)
    }

    /// Writes one 64-byte, line-aligned chunk at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `[addr, addr + LINE_BYTES)`
    /// exceeds the address space.
    pub fn write_line(&mut self, addr: u32, data: &[u8; LINE_BYTES]) -> Result<(), MemoryError> {
        let start = addr as usize;
        let end = start + LINE_BYTES;
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfRange {
                addr,
                width: LINE_BYTES as u32,
                limit: MEM_SIZE,
            });
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Reads an arbitrary-length byte window, used for the output window
    /// snapshot after a run has flushed its cache.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `[base, base + len)` exceeds
    /// the address space.
    pub fn read_bytes(&self, base: u32, len: u32) -> Result<Vec<u8>, MemoryError> {
        let start = base as usize;
        let end = start + len as usize;
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfRange {
                addr: base,
                width: len,
                limit: MEM_SIZE,
            });
        }
        Ok(self.bytes[start..end].to_vec())
    }

    /// Writes an arbitrary-length byte slice at `base`, used to overlay
    /// image fragments (which are not necessarily line-aligned or
    /// line-sized) directly into RAM, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `[base, base + data.len())`
    /// exceeds the address space.
    pub fn write_bytes(&mut self, base: u32, data: &[u8]) -> Result<(), MemoryError> {
        let start = base as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfRange {
                addr: base,
                width: data.len() as u32,
                limit: MEM_SIZE,
            });
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_overlay_in_load_order() {
        let fragments = vec![
            Fragment {
                base: 0x100,
                bytes: vec![1, 2, 3, 4],
            },
            Fragment {
                base: 0x102,
                bytes: vec![9, 9],
            },
        ];
        let ram = Ram::from_fragments(&fragments).unwrap();
        assert_eq!(ram.read_bytes(0x100, 4).unwrap(), vec![1, 2, 9, 9]);
    }

    #[test]
    fn line_round_trips() {
        let mut ram = Ram::new();
        let mut line = [0u8; LINE_BYTES];
        line[0] = 0xAB;
        line[63] = 0xCD;
        ram.write_line(0x40, &line).unwrap();
        assert_eq!(ram.read_line(0x40).unwrap(), line);
    }

    #[test]
    fn out_of_range_line_access_errors() {
        let ram = Ram::new();
        let addr = (MEM_SIZE - LINE_BYTES + 1) as u32;
        assert!(matches!(
            ram.read_line(addr),
            Err(MemoryError::OutOfRange { .. })
        ));
    }

    #[test]
    fn fragment_out_of_range_errors() {
        let fragments = vec![Fragment {
            base: (MEM_SIZE - 1) as u32,
            bytes: vec![1, 2, 3, 4],
        }];
        assert!(matches!(
            Ram::from_fragments(&fragments),
            Err(MemoryError::OutOfRange { .. })
        ));
    }
}
