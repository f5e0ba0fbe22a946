//! Violation Types
//!
//! Core types for the integrity ledger. No logic - just data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exam::StudentIdentity;

// ============================================================================
// CATEGORY
// ============================================================================

/// Closed set of violation categories. Policy decisions key off this tag,
/// never off the display description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    TabSwitch,
    CopyAttempt,
    PasteAttempt,
    FullscreenExit,
    SuspiciousActivity,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::TabSwitch => "tab_switch",
            ViolationCategory::CopyAttempt => "copy_attempt",
            ViolationCategory::PasteAttempt => "paste_attempt",
            ViolationCategory::FullscreenExit => "fullscreen_exit",
            ViolationCategory::SuspiciousActivity => "suspicious_activity",
        }
    }

    /// Which strike pool this category counts against.
    pub fn pool(&self) -> ViolationPool {
        match self {
            ViolationCategory::TabSwitch => ViolationPool::TabSwitch,
            _ => ViolationPool::CopyPaste,
        }
    }

    pub const ALL: [ViolationCategory; 5] = [
        ViolationCategory::TabSwitch,
        ViolationCategory::CopyAttempt,
        ViolationCategory::PasteAttempt,
        ViolationCategory::FullscreenExit,
        ViolationCategory::SuspiciousActivity,
    ];
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// POOL
// ============================================================================

/// Independent strike pools. Tab switches are budgeted separately from
/// content-capture attempts; each pool forces cancellation past its
/// threshold on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPool {
    TabSwitch,
    CopyPaste,
}

impl ViolationPool {
    /// Phrase used in the cancellation reason string.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            ViolationPool::TabSwitch => "tab switches",
            ViolationPool::CopyPaste => "copy/paste attempts",
        }
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity of a violation, derived from the running count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VIOLATION RECORD
// ============================================================================

/// Immutable violation row persisted through the gateway.
/// Append-only; never modified after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub id: String,
    pub attempt_id: String,
    pub student_id: String,
    pub student_name: String,
    pub admission_id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub category: ViolationCategory,
    /// Display text only - carries the "(n/max)" suffix for the admin view
    pub description: String,
    pub severity: Severity,
    /// Sequence number within this record's category
    pub sequence: u32,
    pub timestamp: DateTime<Utc>,
}

impl ViolationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attempt_id: &str,
        student: &StudentIdentity,
        exam_id: &str,
        exam_title: &str,
        category: ViolationCategory,
        description: String,
        severity: Severity,
        sequence: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            student_id: student.student_id.clone(),
            student_name: student.student_name.clone(),
            admission_id: student.admission_id.clone(),
            exam_id: exam_id.to_string(),
            exam_title: exam_title.to_string(),
            category,
            description,
            severity,
            sequence,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
