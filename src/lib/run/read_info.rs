//! Read structure of a run.

use serde::{Deserialize, Serialize};

/// Inclusive range of cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRange {
    /// First cycle (1-based)
    pub first: u32,
    /// Last cycle, inclusive
    pub last: u32,
}

impl CycleRange {
    #[must_use]
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    #[must_use]
    pub fn contains(&self, cycle: u32) -> bool {
        cycle >= self.first && cycle <= self.last
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        if self.last < self.first { 0 } else { self.last - self.first + 1 }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One read of the run: its number, cycle span and whether it is an index read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadInfo {
    number: u32,
    cycles: CycleRange,
    is_index: bool,
}

impl ReadInfo {
    /// Creates a read spanning `first_cycle..first_cycle + cycle_count`.
    #[must_use]
    pub fn new(number: u32, first_cycle: u32, cycle_count: u32, is_index: bool) -> Self {
        let last = (first_cycle + cycle_count).saturating_sub(1);
        Self { number, cycles: CycleRange::new(first_cycle, last), is_index }
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn is_index(&self) -> bool {
        self.is_index
    }

    #[must_use]
    pub fn first_cycle(&self) -> u32 {
        self.cycles.first
    }

    #[must_use]
    pub fn last_cycle(&self) -> u32 {
        self.cycles.last
    }

    #[must_use]
    pub fn total_cycles(&self) -> u32 {
        self.cycles.len()
    }

    /// Cycles that contribute to read-level statistics (all but the last one).
    #[must_use]
    pub fn useable_cycles(&self) -> u32 {
        self.total_cycles().saturating_sub(1)
    }

    #[must_use]
    pub fn cycle_range(&self) -> CycleRange {
        self.cycles
    }
}
