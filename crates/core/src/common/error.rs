//! Error types returned at the memory and execution boundaries.
//!
//! Unlike the teacher's hand-rolled `Trap` enum (this simulator has no
//! privileged architecture, so there is nothing to trap into), these are
//! plain `thiserror`-derived errors: both are fatal conditions the
//! simulation driver reports and stops on, rather than traps a guest
//! handler could recover from.

use thiserror::Error;

/// A fatal error from the RAM/cache memory subsystem.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// An access (possibly spanning a multi-byte width) fell outside the
    /// simulator's `MEM_SIZE`-byte address space.
    #[error("address {addr:#07x} (width {width} bytes) is out of range (memory size is {limit:#07x})")]
    OutOfRange {
        /// The address that was accessed.
        addr: u32,
        /// The width of the access, in bytes.
        width: u32,
        /// The size of the address space.
        limit: usize,
    },
}

/// A fatal error from the execution engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// The fetched instruction did not decode to any opcode this core
    /// implements. The original C++ program silently ignores this case and
    /// spins on the same program counter forever; this simulator instead
    /// reports it as a fatal error (see DESIGN.md).
    #[error("unsupported opcode {opcode:#04x} at pc {pc:#07x}")]
    UnsupportedOpcode {
        /// The program counter of the offending instruction.
        pc: u32,
        /// The raw opcode field that was not recognized.
        opcode: u32,
    },

    /// A memory access made during instruction fetch, load, or store failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
