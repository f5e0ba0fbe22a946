//! Error handling
//!
//! Error taxonomy for the proctoring core. Violation-path failures never
//! reach the caller; submission/cancellation-path persistence failures do,
//! and are retryable.

use std::fmt;

pub type ProctorResult<T> = Result<T, ProctorError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProctorError {
    /// Attempt construction without a valid exam definition or identity.
    Precondition(String),

    /// A prior attempt already exists for this (student, exam) pair.
    AlreadyTaken { student_id: String, exam_id: String },

    /// Durable save of a result or cancellation failed. The in-memory
    /// lifecycle has already reached its terminal state; the save can be
    /// retried without redoing the attempt.
    Persistence(String),

    /// A monitor source failed while handling a host event. Isolated to
    /// that monitor, never surfaced to the end user.
    Monitor { monitor: &'static str, message: String },
}

impl ProctorError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        ProctorError::Precondition(msg.into())
    }

    /// True for errors where retrying the failed save (not the attempt)
    /// is the correct recovery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProctorError::Persistence(_))
    }
}

impl fmt::Display for ProctorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProctorError::Precondition(msg) => write!(f, "precondition failed: {}", msg),
            ProctorError::AlreadyTaken { student_id, exam_id } => {
                write!(f, "student {} has already taken exam {}", student_id, exam_id)
            }
            ProctorError::Persistence(msg) => write!(f, "persistence error: {}", msg),
            ProctorError::Monitor { monitor, message } => {
                write!(f, "monitor '{}' error: {}", monitor, message)
            }
        }
    }
}

impl std::error::Error for ProctorError {}
