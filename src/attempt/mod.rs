//! Attempt Module
//!
//! The exam attempt state machine and the result compiler.
//!
//! ## Structure
//! - `machine`: ExamAttempt lifecycle, guards, timer, terminal transitions
//! - `score`: pure result compilation (flag-forfeits-credit scoring)

pub mod machine;
pub mod score;

pub use machine::{ExamAttempt, Lifecycle, Progress, QuestionStatus};
pub use score::{compile, AttemptSnapshot, ExamOutcome, ExamResult};
