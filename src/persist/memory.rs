//! In-Memory Gateway
//!
//! Vec-backed gateway for tests and in-process embedding. Failure
//! injection flags simulate an unreachable backend per call family.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CancellationNotice, PersistenceGateway};
use crate::attempt::ExamResult;
use crate::error::{ProctorError, ProctorResult};
use crate::violation::ViolationRecord;

#[derive(Default)]
pub struct MemoryGateway {
    violations: Mutex<Vec<ViolationRecord>>,
    results: Mutex<Vec<ExamResult>>,
    cancellations: Mutex<Vec<CancellationNotice>>,
    fail_violations: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a prior result so `find_prior_attempt` returns non-null.
    pub fn with_prior_result(self, result: ExamResult) -> Self {
        self.results.lock().push(result);
        self
    }

    /// Make `append_violation` fail until cleared.
    pub fn set_fail_violations(&self, fail: bool) {
        self.fail_violations.store(fail, Ordering::SeqCst);
    }

    /// Make `save_result`/`save_cancellation` fail until cleared.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn violations(&self) -> Vec<ViolationRecord> {
        self.violations.lock().clone()
    }

    pub fn results(&self) -> Vec<ExamResult> {
        self.results.lock().clone()
    }

    pub fn cancellations(&self) -> Vec<CancellationNotice> {
        self.cancellations.lock().clone()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn find_prior_attempt(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> ProctorResult<Option<ExamResult>> {
        let results = self.results.lock();
        Ok(results
            .iter()
            .filter(|r| r.student_id == student_id && r.exam_id == exam_id)
            .max_by_key(|r| r.submitted_at)
            .cloned())
    }

    async fn append_violation(&self, record: &ViolationRecord) -> ProctorResult<()> {
        if self.fail_violations.load(Ordering::SeqCst) {
            return Err(ProctorError::Persistence("violation store unreachable".into()));
        }
        self.violations.lock().push(record.clone());
        Ok(())
    }

    async fn save_result(&self, result: &ExamResult) -> ProctorResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ProctorError::Persistence("result store unreachable".into()));
        }
        self.results.lock().push(result.clone());
        Ok(())
    }

    async fn save_cancellation(&self, notice: &CancellationNotice) -> ProctorResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ProctorError::Persistence("cancellation store unreachable".into()));
        }
        self.cancellations.lock().push(notice.clone());
        Ok(())
    }
}
