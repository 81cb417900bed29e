//! Core simulation subsystems: RAM, the cache hierarchy, and the CPU.
//!
//! Narrowed from the teacher's `core` module (which additionally owned the
//! pipeline, the MMU, and a multi-level cache hierarchy behind a system
//! bus): this system has one unified cache in front of one flat RAM, and
//! the "pipeline" is a single fetch-decode-execute loop, so there is no
//! separate `pipeline` submodule.

/// The 64-byte-line, 16-set, 4-way set-associative cache and its
/// replacement policies.
pub mod cache;

/// The fetch-decode-dispatch execution engine and register file owner.
pub mod cpu;

/// The flat byte-addressable backing store.
pub mod ram;

pub use cache::CacheController;
pub use cpu::Cpu;
pub use ram::Ram;
