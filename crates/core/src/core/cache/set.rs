//! One 4-way set: the lines themselves plus the policy tracking their
//! recency.
//!
//! Grounded on `original_source/simulate.hpp`'s per-set `ways` array
//! paired with its active replacement policy, and the teacher's
//! `CacheSim`'s pattern of keeping a set's policy state alongside its
//! lines rather than in a separate global table.

use crate::common::constants::WAYS;
use crate::common::Width;
use crate::core::cache::line::CacheLine;
use crate::core::cache::policy::Policy;

/// The four ways of a single cache set, plus the policy governing which
/// one is evicted next.
pub struct CacheSet {
    lines: [CacheLine; WAYS],
    policy: Policy,
}

impl CacheSet {
    /// Builds an empty set governed by `policy`.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            lines: std::array::from_fn(|_| CacheLine::empty()),
            policy,
        }
    }

    /// Returns the way holding `tag`, if any valid line matches.
    #[must_use]
    pub fn hit(&self, tag: u32) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Selects (without mutating) the way that should be evicted next.
    #[must_use]
    pub fn victim(&self) -> usize {
        self.policy.victim(&self.lines)
    }

    /// Borrows a way's line.
    #[must_use]
    pub fn line(&self, way: usize) -> &CacheLine {
        &self.lines[way]
    }

    /// Installs freshly-fetched data into `way`, evicting whatever was
    /// there.
    pub fn refill(&mut self, way: usize, bytes: [u8; crate::common::constants::LINE_BYTES], tag: u32) {
        self.lines[way].refill(bytes, tag);
    }

    /// Reads through `way`, recording the touch with the active policy.
    #[must_use]
    pub fn read(&mut self, way: usize, width: Width, offset: u32) -> u32 {
        self.policy.access(&mut self.lines, way);
        self.lines[way].read(width, offset)
    }

    /// Writes through `way`, recording the touch with the active policy.
    pub fn write(&mut self, way: usize, width: Width, offset: u32, value: u32) {
        self.policy.access(&mut self.lines, way);
        self.lines[way].write(width, offset, value);
    }

    /// Resets `way` to its post-flush rest state.
    pub fn invalidate(&mut self, way: usize) {
        self.lines[way].invalidate();
    }
}
