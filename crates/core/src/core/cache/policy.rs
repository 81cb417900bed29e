//! Way-replacement policies: true LRU and bit-pLRU (NRU).
//!
//! Grounded on `original_source/simulate.hpp`'s `LRUCache`/`BitPLRUCache`
//! replacement logic, and shaped after the teacher's
//! `core/units/cache/policies` split of "which way is the victim" from
//! "record a touch" into two small methods per policy — except here there
//! are exactly two policies so they live as variants of one enum rather
//! than trait objects, since nothing else will ever implement a third.

use crate::common::constants::WAYS;
use crate::core::cache::line::CacheLine;

/// Which way a set's next miss should evict, and how a set tracks
/// recency to answer that question.
#[derive(Clone)]
pub enum Policy {
    /// True LRU via an ordered list of touched ways: the next victim is
    /// the first never-touched way, or else the least-recently-touched
    /// way (the front of the list).
    Lru(LruState),
    /// Bit-pseudo-LRU / NRU: each line carries a single "recently used"
    /// bit. The victim is the lowest-indexed way whose bit is unset; when
    /// a touch would set every bit, all bits reset to 0 first, then the
    /// touched way's bit is set.
    Plru,
}

/// Ordered list of ways touched since the set was last fully reset,
/// oldest first.
#[derive(Clone, Default)]
pub struct LruState {
    touched: Vec<usize>,
}

impl Policy {
    /// A fresh true-LRU policy with no recorded touches.
    #[must_use]
    pub fn lru() -> Self {
        Self::Lru(LruState::default())
    }

    /// A fresh bit-pLRU policy (line state carries the bits, so there is
    /// nothing to initialize here).
    #[must_use]
    pub const fn plru() -> Self {
        Self::Plru
    }

    /// Selects the way to evict on a miss, without mutating any state.
    #[must_use]
    pub fn victim(&self, lines: &[CacheLine; WAYS]) -> usize {
        match self {
            Self::Lru(state) => {
                if state.touched.len() < WAYS {
                    state.touched.len()
                } else {
                    state.touched[0]
                }
            }
            Self::Plru => lines
                .iter()
                .position(|line| !line.plru_bit)
                .unwrap_or(0),
        }
    }

    /// Records that `way` was just accessed (hit or post-refill),
    /// updating recency metadata accordingly.
    pub fn access(&mut self, lines: &mut [CacheLine; WAYS], way: usize) {
        match self {
            Self::Lru(state) => {
                state.touched.retain(|&w| w != way);
                state.touched.push(way);
            }
            Self::Plru => {
                let all_set = lines.iter().enumerate().all(|(i, line)| i == way || line.plru_bit);
                if all_set {
                    for line in lines.iter_mut() {
                        line.plru_bit = false;
                    }
                }
                lines[way].plru_bit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_lines() -> [CacheLine; WAYS] {
        std::array::from_fn(|_| CacheLine::empty())
    }

    #[test]
    fn lru_fills_cold_ways_in_order() {
        let lines = empty_lines();
        let policy = Policy::lru();
        assert_eq!(policy.victim(&lines), 0);
    }

    #[test]
    fn lru_evicts_least_recently_touched() {
        let mut lines = empty_lines();
        let mut policy = Policy::lru();
        for way in 0..WAYS {
            policy.access(&mut lines, way);
        }
        assert_eq!(policy.victim(&lines), 0);
        policy.access(&mut lines, 0);
        assert_eq!(policy.victim(&lines), 1);
    }

    #[test]
    fn plru_picks_lowest_unset_bit() {
        let mut lines = empty_lines();
        let mut policy = Policy::plru();
        policy.access(&mut lines, 0);
        assert_eq!(policy.victim(&lines), 1);
    }

    #[test]
    fn plru_resets_all_bits_on_saturation() {
        let mut lines = empty_lines();
        let mut policy = Policy::plru();
        for way in 0..WAYS {
            policy.access(&mut lines, way);
        }
        assert!(lines[0].plru_bit);
        assert!(lines[1].plru_bit);
        assert!(lines[2].plru_bit);
        assert!(lines[3].plru_bit);
        policy.access(&mut lines, 2);
        assert!(!lines[0].plru_bit);
        assert!(!lines[1].plru_bit);
        assert!(lines[2].plru_bit);
        assert!(!lines[3].plru_bit);
    }
}
