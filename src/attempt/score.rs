//! Result Compiler
//!
//! Pure compilation of an attempt's final state into the persistable
//! result record. Same input always yields the same score - no I/O, no
//! environment. Invoked exactly once per attempt by the state machine.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exam::{ExamDefinition, StudentIdentity};

// ============================================================================
// OUTCOME
// ============================================================================

/// Terminal outcome tag. `Expired` is scored identically to `Submitted`;
/// the tag exists for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamOutcome {
    Submitted,
    Cancelled,
    Expired,
}

impl ExamOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamOutcome::Submitted => "submitted",
            ExamOutcome::Cancelled => "cancelled",
            ExamOutcome::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ExamOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// EXAM RESULT
// ============================================================================

/// The scored, persistable result record. Immutable; this is what crosses
/// the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub attempt_id: String,
    pub student_id: String,
    pub student_name: String,
    pub exam_id: String,
    pub exam_title: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: f32,
    /// Question-key to selected-option-index snapshot
    pub answers: HashMap<String, usize>,
    pub flagged_questions: Vec<String>,
    /// Seconds elapsed between start and the terminal transition
    pub time_spent: u32,
    pub outcome: ExamOutcome,
    pub cancellation_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Borrowed view of the attempt state at the terminal transition.
pub struct AttemptSnapshot<'a> {
    pub attempt_id: &'a str,
    pub student: &'a StudentIdentity,
    pub answers: &'a HashMap<String, usize>,
    pub flagged: &'a HashSet<String>,
    pub remaining_secs: u32,
}

// ============================================================================
// COMPILE
// ============================================================================

/// Compile the final result for an attempt.
///
/// Scoring rule: a question counts correct iff it is NOT flagged and the
/// recorded answer equals the correct index. Flagging forfeits credit even
/// for a correct answer - deliberate policy, preserved from the exam
/// platform's original behavior. Unanswered questions score as incorrect.
/// Cancelled attempts are zero-scored.
pub fn compile(
    snapshot: &AttemptSnapshot<'_>,
    exam: &ExamDefinition,
    outcome: ExamOutcome,
    reason: Option<&str>,
) -> ExamResult {
    let total = exam.total_questions();

    let correct = if outcome == ExamOutcome::Cancelled {
        0
    } else {
        exam.questions
            .iter()
            .filter(|q| {
                let key = q.key();
                !snapshot.flagged.contains(&key)
                    && snapshot.answers.get(&key) == Some(&q.correct_answer)
            })
            .count()
    };

    let score_percentage = if total == 0 || outcome == ExamOutcome::Cancelled {
        0.0
    } else {
        (correct as f32 / total as f32) * 100.0
    };

    let time_spent = exam.duration_secs.saturating_sub(snapshot.remaining_secs);

    let mut flagged: Vec<String> = snapshot.flagged.iter().cloned().collect();
    flagged.sort();

    ExamResult {
        attempt_id: snapshot.attempt_id.to_string(),
        student_id: snapshot.student.student_id.clone(),
        student_name: snapshot.student.student_name.clone(),
        exam_id: exam.id.clone(),
        exam_title: exam.title.clone(),
        total_questions: total,
        correct_answers: correct,
        score_percentage,
        answers: snapshot.answers.clone(),
        flagged_questions: flagged,
        time_spent,
        outcome,
        cancellation_reason: reason.map(|r| r.to_string()),
        submitted_at: Utc::now(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
