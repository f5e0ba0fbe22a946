//! Violation Ledger
//!
//! Per-category monotonic counters feeding two independent strike pools.
//! Pure state - no I/O. Owned exclusively by the proctoring session.

use std::collections::HashMap;

use super::types::{ViolationCategory, ViolationPool};

/// Append-only violation counters. Counts never decrease; increments past
/// the cancellation threshold are still recorded (the attempt is already
/// being cancelled at that point).
#[derive(Debug, Default)]
pub struct ViolationLedger {
    by_category: HashMap<ViolationCategory, u32>,
}

impl ViolationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for `category` and return the new total of
    /// its pool. The per-category count doubles as the record sequence
    /// number; call `category_count` right after to read it.
    pub fn record_and_count(&mut self, category: ViolationCategory) -> u32 {
        *self.by_category.entry(category).or_insert(0) += 1;
        self.pool_count(category.pool())
    }

    /// Total violations counted against a pool.
    pub fn pool_count(&self, pool: ViolationPool) -> u32 {
        ViolationCategory::ALL
            .iter()
            .filter(|c| c.pool() == pool)
            .map(|c| self.by_category.get(c).copied().unwrap_or(0))
            .sum()
    }

    /// Violations recorded for a single category.
    pub fn category_count(&self, category: ViolationCategory) -> u32 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.by_category.values().sum()
    }
}
