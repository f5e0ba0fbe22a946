//! Persistence Module
//!
//! The gateway boundary to durable storage. The core never blocks its
//! state machine on these calls: violation appends are fire-and-forget,
//! and result/cancellation saves happen after the in-memory terminal
//! transition is already authoritative.
//!
//! ## Structure
//! - `memory`: in-process gateway with failure injection (tests, embedding)
//! - `jsonl`: append-only JSONL audit files with rotation

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlGateway;
pub use memory::MemoryGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attempt::ExamResult;
use crate::error::ProctorResult;
use crate::violation::ViolationRecord;

/// Payload for a forced-cancellation save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationNotice {
    pub attempt_id: String,
    pub student_id: String,
    pub student_name: String,
    pub exam_id: String,
    pub exam_title: String,
    pub reason: String,
}

/// External durable store for attempts, violations, and results.
///
/// `append_violation` failures are logged and swallowed by the session;
/// `save_result`/`save_cancellation` failures surface to the host as
/// retryable errors - they are the only durable record of the attempt.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Latest prior result for this (student, exam) pair, if any. A
    /// non-null return blocks starting a new attempt.
    async fn find_prior_attempt(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> ProctorResult<Option<ExamResult>>;

    async fn append_violation(&self, record: &ViolationRecord) -> ProctorResult<()>;

    async fn save_result(&self, result: &ExamResult) -> ProctorResult<()>;

    async fn save_cancellation(&self, notice: &CancellationNotice) -> ProctorResult<()>;
}
