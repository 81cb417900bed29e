//! Global system constants.
//!
//! This module defines the fixed dimensions of the memory/cache system and
//! the bit masks/shifts used by the instruction decoder. Everything here is
//! a compile-time constant: this simulator has no runtime-configurable
//! dimensions and no configuration surface at all.

/// Width of the address space in bits (`2^17` bytes of RAM).
pub const ADDR_BITS: u32 = 17;

/// Total RAM size in bytes.
pub const MEM_SIZE: usize = 1 << ADDR_BITS;

/// Bytes per cache line.
pub const LINE_BYTES: usize = 64;

/// Bits of the address consumed by the in-line byte offset.
pub const OFFSET_BITS: u32 = 6;

/// Mask selecting the offset field of an address.
pub const OFFSET_MASK: u32 = (1 << OFFSET_BITS) - 1;

/// Number of cache sets.
pub const NUM_SETS: usize = 16;

/// Bits of the address consumed by the set index.
pub const INDEX_BITS: u32 = 4;

/// Mask selecting the index field of an address (after shifting out the offset).
pub const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Ways per cache set.
pub const WAYS: usize = 4;

/// Bits of the address left over for the tag field.
pub const TAG_BITS: u32 = ADDR_BITS - INDEX_BITS - OFFSET_BITS;

/// Sentinel tag value for an invalid/flushed cache line.
pub const INVALID_TAG: u32 = u32::MAX;

/// Number of general-purpose registers (`x0`..=`x31`).
pub const NUM_REGS: usize = 32;

/// Bit mask for extracting the opcode field from a 32-bit instruction.
pub const OPCODE_MASK: u32 = 0x7F;

/// Bit mask for a 5-bit register index field (`rd`/`rs1`/`rs2`).
pub const REG_MASK: u32 = 0x1F;

/// Bit mask for a 3-bit `funct3` field.
pub const FUNCT3_MASK: u32 = 0x7;

/// Bit mask for a 7-bit `funct7` field.
pub const FUNCT7_MASK: u32 = 0x7F;

/// Bit mask for a 5-bit shift amount (`shamt`) field.
pub const SHAMT_MASK: u32 = 0x1F;

/// Size of a RISC-V standard (32-bit) instruction, in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;
