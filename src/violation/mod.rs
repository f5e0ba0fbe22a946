//! Violation Module
//!
//! The integrity ledger and its policy tables.
//!
//! ## Structure
//! - `types`: Core types (ViolationCategory, ViolationPool, Severity, ViolationRecord)
//! - `ledger`: Per-category counters and strike pools
//! - `classify`: Count-to-severity mapping

pub mod classify;
pub mod ledger;
pub mod types;

pub use classify::{classify, classify_with_table, SEVERITY_TABLE};
pub use ledger::ViolationLedger;
pub use types::{Severity, ViolationCategory, ViolationPool, ViolationRecord};
