//! Exam Attempt State Machine
//!
//! One student's single timed session against one exam definition.
//! Lifecycle: `InProgress -> Submitted | Cancelled | Expired`, with exactly
//! one terminal transition per attempt. All mutation guards are silent
//! no-ops after the terminal state so stale UI callbacks firing after
//! teardown cannot corrupt anything.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::score::{self, AttemptSnapshot, ExamOutcome, ExamResult};
use crate::error::{ProctorError, ProctorResult};
use crate::exam::{ExamDefinition, QuestionId, StudentIdentity};

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Attempt lifecycle state. The transient submitting/cancelling phases
/// collapse into the synchronous finalize step: the in-memory terminal
/// state is authoritative immediately and never blocks on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    InProgress,
    Submitted,
    Cancelled,
    Expired,
}

impl Lifecycle {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Lifecycle::InProgress)
    }
}

// ============================================================================
// PROGRESS SNAPSHOT
// ============================================================================

/// Per-question status for the host's navigator/submit views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotAnswered,
    Answered,
    Flagged,
}

/// Read-only progress summary.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub total: usize,
    pub answered: usize,
    pub flagged: usize,
    pub current_question: usize,
    pub statuses: Vec<QuestionStatus>,
}

// ============================================================================
// EXAM ATTEMPT
// ============================================================================

/// The mutable heart of an exam session. Mutated only through its own
/// methods, always from a single logical call stack.
pub struct ExamAttempt {
    attempt_id: String,
    exam: Arc<ExamDefinition>,
    student: StudentIdentity,
    answers: HashMap<String, usize>,
    flagged: HashSet<String>,
    remaining_secs: u32,
    lifecycle: Lifecycle,
    started_at: DateTime<Utc>,
    current_question: usize,
    /// Compiled exactly once, at the terminal transition.
    result: Option<ExamResult>,
}

impl ExamAttempt {
    /// Construct a new attempt. Fails with a precondition error when the
    /// exam definition or the identity is unusable; no attempt is created.
    /// The timer starts here, not at the first answer.
    pub fn new(exam: Arc<ExamDefinition>, student: StudentIdentity) -> ProctorResult<Self> {
        if exam.questions.is_empty() {
            return Err(ProctorError::precondition("exam has no questions"));
        }
        if exam.duration_secs == 0 {
            return Err(ProctorError::precondition("exam duration is zero"));
        }
        if student.student_id.is_empty() {
            return Err(ProctorError::precondition("missing student identity"));
        }

        let remaining_secs = exam.duration_secs;
        Ok(Self {
            attempt_id: Uuid::new_v4().to_string(),
            exam,
            student,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            remaining_secs,
            lifecycle: Lifecycle::InProgress,
            started_at: Utc::now(),
            current_question: 0,
            result: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    pub fn exam(&self) -> &ExamDefinition {
        &self.exam
    }

    pub fn student(&self) -> &StudentIdentity {
        &self.student
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The result compiled at the terminal transition, if any.
    pub fn result(&self) -> Option<&ExamResult> {
        self.result.as_ref()
    }

    pub fn answer_for(&self, question_id: &QuestionId) -> Option<usize> {
        self.answers.get(&question_id.normalize()).copied()
    }

    pub fn is_flagged(&self, question_id: &QuestionId) -> bool {
        self.flagged.contains(&question_id.normalize())
    }

    // ------------------------------------------------------------------
    // Mutation (guarded)
    // ------------------------------------------------------------------

    /// Record or overwrite an answer. Silent no-op after a terminal state
    /// or for an out-of-range option index. Keys are inserted only here
    /// and never removed.
    pub fn record_answer(&mut self, question_id: &QuestionId, option_index: usize) {
        if self.lifecycle.is_terminal() {
            return;
        }
        let key = question_id.normalize();
        match self.exam.question_by_key(&key) {
            Some(q) if option_index < q.options.len() => {
                self.answers.insert(key, option_index);
            }
            _ => {
                log::debug!("ignoring answer for unknown question/option: {}", key);
            }
        }
    }

    /// Toggle review-flag membership for a question.
    pub fn toggle_flag(&mut self, question_id: &QuestionId) {
        if self.lifecycle.is_terminal() {
            return;
        }
        let key = question_id.normalize();
        if !self.flagged.remove(&key) {
            self.flagged.insert(key);
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn next_question(&mut self) {
        if !self.lifecycle.is_terminal()
            && self.current_question + 1 < self.exam.questions.len()
        {
            self.current_question += 1;
        }
    }

    pub fn previous_question(&mut self) {
        if !self.lifecycle.is_terminal() {
            self.current_question = self.current_question.saturating_sub(1);
        }
    }

    pub fn jump_to(&mut self, index: usize) {
        if !self.lifecycle.is_terminal() && index < self.exam.questions.len() {
            self.current_question = index;
        }
    }

    pub fn progress(&self) -> Progress {
        let statuses: Vec<QuestionStatus> = self
            .exam
            .questions
            .iter()
            .map(|q| {
                let key = q.key();
                if self.flagged.contains(&key) {
                    QuestionStatus::Flagged
                } else if self.answers.contains_key(&key) {
                    QuestionStatus::Answered
                } else {
                    QuestionStatus::NotAnswered
                }
            })
            .collect();
        Progress {
            total: self.exam.questions.len(),
            answered: self.answers.len(),
            flagged: self.flagged.len(),
            current_question: self.current_question,
            statuses,
        }
    }

    // ------------------------------------------------------------------
    // Timer & penalties
    // ------------------------------------------------------------------

    /// One countdown tick. Returns the compiled result when the timer
    /// reaches zero (the timeout path auto-submits current answers).
    pub fn tick(&mut self) -> Option<&ExamResult> {
        if self.lifecycle.is_terminal() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.finalize(ExamOutcome::Expired, None));
        }
        None
    }

    /// Subtract a time penalty, floored at zero. A penalty larger than
    /// the remaining time triggers exactly the same expiry path as the
    /// natural countdown.
    pub fn apply_time_penalty(&mut self, seconds: u32) -> Option<&ExamResult> {
        if self.lifecycle.is_terminal() || seconds == 0 {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(seconds);
        log::info!(
            "time penalty applied: -{}s, {}s remaining",
            seconds,
            self.remaining_secs
        );
        if self.remaining_secs == 0 {
            return Some(self.finalize(ExamOutcome::Expired, None));
        }
        None
    }

    // ------------------------------------------------------------------
    // Terminal transitions
    // ------------------------------------------------------------------

    /// Manual submission. Idempotent: repeat calls return the result
    /// compiled by the first terminal transition, whichever it was.
    pub fn request_submission(&mut self) -> &ExamResult {
        self.finalize(ExamOutcome::Submitted, None)
    }

    /// Forced cancellation. Same idempotency guarantee as submission.
    pub fn request_cancellation(&mut self, reason: &str) -> &ExamResult {
        self.finalize(ExamOutcome::Cancelled, Some(reason))
    }

    /// The single terminal transition. Whichever outcome is requested
    /// first wins; later calls are no-ops returning the cached result.
    fn finalize(&mut self, outcome: ExamOutcome, reason: Option<&str>) -> &ExamResult {
        if self.result.is_none() {
            let snapshot = AttemptSnapshot {
                attempt_id: &self.attempt_id,
                student: &self.student,
                answers: &self.answers,
                flagged: &self.flagged,
                remaining_secs: self.remaining_secs,
            };
            let result = score::compile(&snapshot, &self.exam, outcome, reason);
            log::info!(
                "attempt {} finalized: {} ({}/{} correct)",
                self.attempt_id,
                outcome,
                result.correct_answers,
                result.total_questions
            );
            self.lifecycle = match outcome {
                ExamOutcome::Submitted => Lifecycle::Submitted,
                ExamOutcome::Cancelled => Lifecycle::Cancelled,
                ExamOutcome::Expired => Lifecycle::Expired,
            };
            self.result = Some(result);
        }
        self.result.as_ref().expect("result set above")
    }
}

// ============================================================================
// TESTS
// ============================================================================
