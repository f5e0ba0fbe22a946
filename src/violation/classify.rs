//! Severity Classifier
//!
//! Maps a running pool count to a severity level. The threshold table
//! is the single source of truth - policy lives here, not duplicated at
//! call sites.

use super::types::Severity;

/// Count thresholds, highest first. A count of `n` gets the severity of
/// the first row with `n >= threshold`.
pub const SEVERITY_TABLE: &[(u32, Severity)] = &[
    (7, Severity::High),
    (3, Severity::Medium),
    (0, Severity::Low),
];

/// Classify a violation count using the default threshold table.
pub fn classify(count: u32) -> Severity {
    classify_with_table(count, SEVERITY_TABLE)
}

/// Classification with a custom table (highest threshold first).
pub fn classify_with_table(count: u32, table: &[(u32, Severity)]) -> Severity {
    table
        .iter()
        .find(|(threshold, _)| count >= *threshold)
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Low)
}
