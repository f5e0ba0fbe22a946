//! Exam Content & Identity
//!
//! Read-only inputs to a proctored session: the exam definition supplied by
//! the question bank and the student identity supplied by the auth
//! collaborator. The core trusts both as given.

use serde::{Deserialize, Serialize};

// ============================================================================
// QUESTION
// ============================================================================

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Source id; may originate as a string or a number upstream.
    pub id: QuestionId,
    pub text: String,
    /// Optional reading passage shown alongside the question
    pub passage: Option<String>,
    /// Ordered option strings
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    pub correct_answer: usize,
}

impl Question {
    /// Normalized map key for this question. Every answers/flags lookup
    /// goes through this single path.
    pub fn key(&self) -> String {
        self.id.normalize()
    }
}

/// Question ids arrive as either strings or numbers depending on the bank
/// that produced them; both normalize to a string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Text(String),
    Number(u64),
}

impl QuestionId {
    pub fn normalize(&self) -> String {
        match self {
            QuestionId::Text(s) => s.clone(),
            QuestionId::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

impl From<u64> for QuestionId {
    fn from(n: u64) -> Self {
        QuestionId::Number(n)
    }
}

// ============================================================================
// EXAM DEFINITION
// ============================================================================

/// Immutable exam definition, referenced read-only by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamDefinition {
    pub id: String,
    pub title: String,
    /// Total exam duration in seconds
    pub duration_secs: u32,
    pub questions: Vec<Question>,
}

impl ExamDefinition {
    pub fn question_by_key(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.key() == key)
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }
}

// ============================================================================
// STUDENT IDENTITY
// ============================================================================

/// Authenticated student identity, supplied by the auth collaborator.
/// Not re-verified here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub student_id: String,
    pub student_name: String,
    pub admission_id: String,
}

impl StudentIdentity {
    pub fn new(student_id: &str, student_name: &str, admission_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            admission_id: admission_id.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
