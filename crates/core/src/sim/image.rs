//! Parsing the binary input image: an initial register file followed by a
//! stream of RAM fragments.
//!
//! Grounded on `original_source/bin_parser.hpp`'s `BinParser`: it reads
//! exactly 32 little-endian `uint32_t` words into the register file (slot 0
//! is the initial program counter, slots 1-31 are `x1`-`x31`), then loops
//! reading `(base: uint32_t, len: uint32_t, payload: len bytes)` triples
//! until a read comes up short, at which point it stops silently rather
//! than treating the truncation as an error.

use std::io::Read;

use thiserror::Error;

use crate::common::constants::{MEM_SIZE, NUM_REGS};

/// A single `(base, payload)` region to be written into RAM at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The byte address the payload is written at.
    pub base: u32,
    /// The bytes to write, `base..base + bytes.len()`.
    pub bytes: Vec<u8>,
}

/// The 32-word initial register file: slot 0 is the initial PC, slots
/// 1-31 are `x1`-`x31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage {
    /// `regs[0]` is the initial PC; `regs[1..32]` are `x1..x31`.
    pub regs: [u32; NUM_REGS],
}

/// A fully-parsed input image: the initial register state plus the RAM
/// fragments to load before execution starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// The initial register file.
    pub registers: RegisterImage,
    /// RAM fragments in load order; later fragments win on overlap.
    pub fragments: Vec<Fragment>,
}

/// Errors that can occur while parsing an input image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// An I/O error while reading the image stream.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// A fragment's `[base, base + len)` range falls outside the address
    /// space.
    #[error("fragment at base {base:#x} with length {len} exceeds the address space")]
    FragmentOutOfRange {
        /// The fragment's base address.
        base: u32,
        /// The fragment's declared length.
        len: u32,
    },
}

fn read_u32<R: Read>(reader: &mut R) -> std::io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < 4 {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(None);
        }
        filled += n;
    }
    Ok(Some(u32::from_le_bytes(buf)))
}

fn read_exact_or_short<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(None);
        }
        filled += n;
    }
    Ok(Some(buf))
}

/// Parses an image from `reader`.
///
/// Reads exactly [`NUM_REGS`] little-endian `u32` register words, then
/// loops reading `(base, len, payload)` fragments. Any short read while
/// looking for the next fragment's `base` is treated as a clean
/// end-of-stream, matching `original_source`'s trailing-garbage tolerance;
/// a short read in the middle of a fragment already announced by a valid
/// `(base, len)` pair is also treated as end-of-stream rather than an
/// error, since the original parser has no way to distinguish the two.
///
/// # Errors
///
/// Returns [`ImageError::Io`] on an I/O failure while reading the fixed
/// register block, and [`ImageError::FragmentOutOfRange`] if a fragment's
/// declared range would fall outside the address space.
pub fn load<R: Read>(mut reader: R) -> Result<Image, ImageError> {
    let mut regs = [0u32; NUM_REGS];
    for reg in &mut regs {
        *reg = read_u32(&mut reader)?.unwrap_or(0);
    }
    let registers = RegisterImage { regs };

    let mut fragments = Vec::new();
    loop {
        let Some(base) = read_u32(&mut reader)? else {
            break;
        };
        let Some(len) = read_u32(&mut reader)? else {
            break;
        };
        let end = base as u64 + u64::from(len);
        if end > MEM_SIZE as u64 {
            return Err(ImageError::FragmentOutOfRange { base, len });
        }
        let Some(bytes) = read_exact_or_short(&mut reader, len as usize)? else {
            break;
        };
        fragments.push(Fragment { base, bytes });
    }

    Ok(Image {
        registers,
        fragments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_bytes(regs: &[u32; NUM_REGS], fragments: &[(u32, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for reg in regs {
            out.extend_from_slice(&reg.to_le_bytes());
        }
        for (base, bytes) in fragments {
            out.extend_from_slice(&base.to_le_bytes());
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        out
    }

    #[test]
    fn parses_registers_and_fragments() {
        let mut regs = [0u32; NUM_REGS];
        regs[0] = 0x1000;
        regs[1] = 0x2000;
        let bytes = image_bytes(&regs, &[(0x10, &[1, 2, 3, 4]), (0x20, &[9, 9])]);
        let image = load(&bytes[..]).unwrap();
        assert_eq!(image.registers.regs[0], 0x1000);
        assert_eq!(image.registers.regs[1], 0x2000);
        assert_eq!(image.fragments.len(), 2);
        assert_eq!(image.fragments[0].base, 0x10);
        assert_eq!(image.fragments[0].bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn no_fragments_is_fine() {
        let regs = [0u32; NUM_REGS];
        let bytes = image_bytes(&regs, &[]);
        let image = load(&bytes[..]).unwrap();
        assert!(image.fragments.is_empty());
    }

    #[test]
    fn trailing_short_fragment_is_discarded_silently() {
        let regs = [0u32; NUM_REGS];
        let mut bytes = image_bytes(&regs, &[]);
        bytes.extend_from_slice(&0x30u32.to_le_bytes());
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);
        let image = load(&bytes[..]).unwrap();
        assert!(image.fragments.is_empty());
    }

    #[test]
    fn out_of_range_fragment_errors() {
        let regs = [0u32; NUM_REGS];
        let bytes = image_bytes(&regs, &[(MEM_SIZE as u32 - 1, &[1, 2, 3, 4])]);
        assert!(matches!(
            load(&bytes[..]),
            Err(ImageError::FragmentOutOfRange { .. })
        ));
    }
}
