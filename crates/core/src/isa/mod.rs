//! Instruction Set Architecture (ISA) definitions.
//!
//! Contains opcodes, function codes, and decoding logic for the two
//! extensions this simulator implements.
//!
//! # Extensions
//!
//! * `rv32i`: Base Integer Instruction Set (32-bit).
//! * `rv32m`: Standard Extension for Integer Multiplication and Division.
//!
//! Narrowed from the teacher's ISA module, which additionally covered
//! RV64, atomics, floating-point, compressed instructions, and the
//! privileged architecture: this core only ever fetches RV32I+M encodings
//! and has no CSRs, traps, or privilege levels to decode.

/// Instruction decoding logic for the I/S/B/U/J formats.
pub mod decode;

/// Instruction field extraction (`opcode`, `rd`, `rs1`, ...).
pub mod instruction;

/// Base integer instruction set (RV32I).
pub mod rv32i;

/// Integer multiply/divide extension (RV32M).
pub mod rv32m;

pub use decode::decode;
pub use instruction::{Decoded, InstructionBits};
