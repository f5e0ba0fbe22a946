//! Proctoring Session
//!
//! Ties one exam attempt to its monitors, violation ledger, and durable
//! record. Owns the enforcement policy: every counted violation warns the
//! student, repeat tab switches cost time, and a full pool cancels the
//! attempt. Terminal state is decided in memory first; durable saves
//! never gate it.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::attempt::{ExamAttempt, ExamResult};
use crate::config::SessionConfig;
use crate::error::{ProctorError, ProctorResult};
use crate::exam::{ExamDefinition, StudentIdentity};
use crate::monitor::{default_monitors, HostEvent, MonitorSource, ViolationSignal};
use crate::notify::SessionObserver;
use crate::persist::{CancellationNotice, PersistenceGateway};
use crate::violation::{classify, ViolationCategory, ViolationLedger, ViolationRecord};

// ============================================================================
// SESSION
// ============================================================================

impl std::fmt::Debug for ProctoringSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProctoringSession")
            .field("watermark_id", &self.watermark_id)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

pub struct ProctoringSession {
    config: SessionConfig,
    attempt: ExamAttempt,
    ledger: ViolationLedger,
    monitors: Vec<Box<dyn MonitorSource>>,
    observer: Arc<dyn SessionObserver>,
    gateway: Arc<dyn PersistenceGateway>,
    watermark_id: String,
    torn_down: bool,
    last_save_error: Arc<Mutex<Option<ProctorError>>>,
}

impl ProctoringSession {
    /// Admit the student and arm the monitors. Fails with `AlreadyTaken`
    /// before any monitor attaches if a prior result exists for this
    /// student/exam pair.
    pub async fn start(
        exam: Arc<ExamDefinition>,
        student: StudentIdentity,
        config: SessionConfig,
        gateway: Arc<dyn PersistenceGateway>,
        observer: Arc<dyn SessionObserver>,
    ) -> ProctorResult<Self> {
        if let Some(prior) = gateway
            .find_prior_attempt(&student.student_id, &exam.id)
            .await?
        {
            log::warn!(
                "Admission refused for {}: prior attempt {} on exam {}",
                student.student_id,
                prior.attempt_id,
                exam.id
            );
            return Err(ProctorError::AlreadyTaken {
                student_id: student.student_id.clone(),
                exam_id: exam.id.clone(),
            });
        }

        let attempt = ExamAttempt::new(exam, student)?;
        let watermark_id = format!(
            "exam-{}-{}-{}",
            attempt.student().student_id,
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().to_string()[..8]
        );
        let monitors = default_monitors(&config);

        log::info!(
            "Session started: attempt {} for {} on '{}' ({} monitors)",
            attempt.attempt_id(),
            attempt.student().student_id,
            attempt.exam().title,
            monitors.len()
        );

        Ok(Self {
            config,
            attempt,
            ledger: ViolationLedger::new(),
            monitors,
            observer,
            gateway,
            watermark_id,
            torn_down: false,
            last_save_error: Arc::new(Mutex::new(None)),
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn attempt(&self) -> &ExamAttempt {
        &self.attempt
    }

    pub fn attempt_mut(&mut self) -> &mut ExamAttempt {
        &mut self.attempt
    }

    pub fn ledger(&self) -> &ViolationLedger {
        &self.ledger
    }

    /// Tamper-evident overlay token for the host to render.
    pub fn watermark_id(&self) -> &str {
        &self.watermark_id
    }

    pub fn is_active(&self) -> bool {
        !self.torn_down && !self.attempt.lifecycle().is_terminal()
    }

    /// Error from the most recent background save, if any. Cleared by a
    /// successful `retry_save`.
    pub fn last_save_error(&self) -> Option<ProctorError> {
        self.last_save_error.lock().clone()
    }

    // ========================================================================
    // EVENT INTAKE
    // ========================================================================

    /// Feed one host event through every monitor and enforce policy on
    /// whatever they flag. Returns the counted signals so the host knows
    /// which default actions to suppress. A torn-down or terminal session
    /// ignores events entirely.
    pub fn handle_event(&mut self, event: &HostEvent) -> Vec<ViolationSignal> {
        if !self.is_active() {
            return Vec::new();
        }

        let mut signals = Vec::new();
        for monitor in &mut self.monitors {
            match monitor.observe(event) {
                Ok(mut flagged) => signals.append(&mut flagged),
                // One failing monitor never takes the session down
                Err(e) => log::warn!("monitor '{}' error: {}", monitor.name(), e),
            }
        }

        for signal in &signals {
            self.enforce(signal);
            if !self.is_active() {
                break;
            }
        }
        signals
    }

    /// Count one signal and apply policy in order: record, warn, penalize
    /// repeat tab switches, cancel on a full pool.
    fn enforce(&mut self, signal: &ViolationSignal) {
        let category = signal.category;
        let pool = category.pool();
        let pool_count = self.ledger.record_and_count(category);
        let sequence = self.ledger.category_count(category);
        // Severity escalates with the pool counter, the same value shown
        // in the description suffix
        let severity = classify(pool_count);
        let max = self.config.max_violations_per_pool;

        let record = ViolationRecord::new(
            self.attempt.attempt_id(),
            self.attempt.student(),
            &self.attempt.exam().id,
            &self.attempt.exam().title,
            category,
            format!("{} ({}/{})", signal.detail, pool_count, max),
            severity,
            sequence,
        );
        log::info!(
            "Violation: {} [{}] {} - pool {}/{}",
            record.category.as_str(),
            record.severity.as_str(),
            record.description,
            pool_count,
            max
        );

        // Fire-and-forget audit append; a slow or failing store must not
        // stall event intake
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(e) = gateway.append_violation(&record).await {
                log::warn!("violation append failed: {}", e);
            }
        });

        self.observer.violation_warning(
            category,
            pool_count,
            max,
            self.config.warning_display(),
        );

        if category == ViolationCategory::TabSwitch && sequence >= 2 {
            if let Some(result) = self
                .attempt
                .apply_time_penalty(self.config.tab_switch_penalty_secs)
            {
                let result = result.clone();
                self.persist_terminal(result);
                self.teardown();
                return;
            }
        }

        if pool_count >= max {
            let reason = format!(
                "Exceeded maximum allowed {} ({})",
                pool.reason_phrase(),
                max
            );
            self.cancel(&reason);
        }
    }

    // ========================================================================
    // TIMER
    // ========================================================================

    /// One countdown tick. Expiry finalizes the attempt with whatever
    /// answers are in place.
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        let expired = self.attempt.tick().cloned();
        // Every tick notifies, the zero tick included
        self.observer.timer_tick(self.attempt.remaining_secs());
        if let Some(result) = expired {
            log::info!("Attempt {} expired, auto-submitting", result.attempt_id);
            self.persist_terminal(result);
            self.teardown();
        }
    }

    // ========================================================================
    // TERMINAL TRANSITIONS
    // ========================================================================

    /// Student-initiated submission. The attempt is terminal before the
    /// save is attempted; a save failure is surfaced as retryable and the
    /// result is still returned by `attempt().result()`.
    pub async fn submit(&mut self) -> ProctorResult<ExamResult> {
        // Repeat submission of a saved attempt returns the cached result
        // without another write
        if self.attempt.lifecycle().is_terminal() && self.last_save_error().is_none() {
            if let Some(result) = self.attempt.result() {
                return Ok(result.clone());
            }
        }
        let result = self.attempt.request_submission().clone();
        self.teardown();
        match self.gateway.save_result(&result).await {
            Ok(()) => {
                *self.last_save_error.lock() = None;
                Ok(result)
            }
            Err(e) => {
                log::error!("result save failed: {}", e);
                *self.last_save_error.lock() = Some(e.clone());
                self.observer.save_failed(&e);
                Err(e)
            }
        }
    }

    /// Policy- or host-initiated cancellation. Terminal immediately; the
    /// result and cancellation notice are saved in the background.
    pub fn cancel(&mut self, reason: &str) {
        let result = self.attempt.request_cancellation(reason).clone();
        self.observer.session_cancelled(reason);
        self.persist_terminal(result);
        self.teardown();
    }

    /// Re-attempt the durable save of a finalized result after an earlier
    /// failure.
    pub async fn retry_save(&mut self) -> ProctorResult<()> {
        let result = match self.attempt.result() {
            Some(r) => r.clone(),
            None => {
                return Err(ProctorError::precondition(
                    "no finalized result to save",
                ))
            }
        };
        self.gateway.save_result(&result).await?;
        if let Some(reason) = &result.cancellation_reason {
            self.gateway
                .save_cancellation(&notice_for(&result, reason))
                .await?;
        }
        *self.last_save_error.lock() = None;
        Ok(())
    }

    /// Background save of a terminal result (and its cancellation notice
    /// when the attempt was cancelled).
    fn persist_terminal(&self, result: ExamResult) {
        let gateway = Arc::clone(&self.gateway);
        let observer = Arc::clone(&self.observer);
        let last_error = Arc::clone(&self.last_save_error);
        tokio::spawn(async move {
            let mut outcome = gateway.save_result(&result).await;
            if outcome.is_ok() {
                if let Some(reason) = &result.cancellation_reason {
                    outcome = gateway
                        .save_cancellation(&notice_for(&result, reason))
                        .await;
                }
            }
            if let Err(e) = outcome {
                log::error!("terminal save failed: {}", e);
                *last_error.lock() = Some(e.clone());
                observer.save_failed(&e);
            }
        });
    }

    /// Detach monitors and stop counting. Idempotent; the ledger and the
    /// attempt's cached result stay readable.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.monitors.clear();
        log::info!("Session for attempt {} torn down", self.attempt.attempt_id());
    }
}

fn notice_for(result: &ExamResult, reason: &str) -> CancellationNotice {
    CancellationNotice {
        attempt_id: result.attempt_id.clone(),
        student_id: result.student_id.clone(),
        student_name: result.student_name.clone(),
        exam_id: result.exam_id.clone(),
        exam_title: result.exam_title.clone(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::Lifecycle;
    use crate::exam::Question;
    use crate::monitor::ClipboardOp;
    use crate::persist::MemoryGateway;

    fn exam() -> Arc<ExamDefinition> {
        Arc::new(ExamDefinition {
            id: "E1".into(),
            title: "Mock Exam".into(),
            duration_secs: 600,
            questions: vec![
                Question {
                    id: "q1".into(),
                    text: "2 + 2 = ?".into(),
                    passage: None,
                    options: vec!["3".into(), "4".into()],
                    correct_answer: 1,
                },
                Question {
                    id: "q2".into(),
                    text: "3 * 3 = ?".into(),
                    passage: None,
                    options: vec!["9".into(), "6".into()],
                    correct_answer: 0,
                },
            ],
        })
    }

    fn student() -> StudentIdentity {
        StudentIdentity::new("S1", "Test Student", "ADM-001")
    }

    async fn session(gateway: Arc<MemoryGateway>) -> ProctoringSession {
        ProctoringSession::start(
            exam(),
            student(),
            SessionConfig::default(),
            gateway,
            Arc::new(crate::notify::NullObserver),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_watermark_shape() {
        let s = session(Arc::new(MemoryGateway::new())).await;
        assert!(s.watermark_id().starts_with("exam-S1-"));
        assert_eq!(s.watermark_id().split('-').count(), 4);
    }

    #[tokio::test]
    async fn test_admission_refused_on_prior_attempt() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut first = session(Arc::clone(&gateway)).await;
        first.submit().await.unwrap();

        let err = ProctoringSession::start(
            exam(),
            student(),
            SessionConfig::default(),
            gateway,
            Arc::new(crate::notify::NullObserver),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProctorError::AlreadyTaken { .. }));
    }

    #[tokio::test]
    async fn test_copy_signal_counts_and_suppresses() {
        let mut s = session(Arc::new(MemoryGateway::new())).await;
        let signals = s.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
        assert_eq!(signals.len(), 1);
        assert!(signals[0].suppress_default);
        assert_eq!(
            s.ledger()
                .pool_count(crate::violation::ViolationPool::CopyPaste),
            1
        );
    }

    #[tokio::test]
    async fn test_severity_tracks_pool_count_across_categories() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut s = session(Arc::clone(&gateway)).await;

        for _ in 0..3 {
            s.handle_event(&HostEvent::Clipboard {
                op: ClipboardOp::Copy,
            });
        }
        s.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Paste,
        });
        tokio::task::yield_now().await;

        // The paste is the 4th strike in the copy/paste pool: medium,
        // even though it is the first paste
        let records = gateway.violations();
        assert_eq!(records.len(), 4);
        let paste = &records[3];
        assert_eq!(paste.sequence, 1);
        assert!(paste.description.ends_with("(4/10)"));
        assert_eq!(paste.severity, crate::violation::Severity::Medium);
    }

    #[tokio::test]
    async fn test_repeat_tab_switch_costs_time() {
        let mut s = session(Arc::new(MemoryGateway::new())).await;
        let before = s.attempt().remaining_secs();

        for _ in 0..2 {
            s.handle_event(&HostEvent::VisibilityChanged { hidden: true });
            s.handle_event(&HostEvent::VisibilityChanged { hidden: false });
        }
        // First switch is free, second costs the penalty
        assert_eq!(s.attempt().remaining_secs(), before - 30);
    }

    #[tokio::test]
    async fn test_events_ignored_after_teardown() {
        let mut s = session(Arc::new(MemoryGateway::new())).await;
        s.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
        s.teardown();
        let signals = s.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
        assert!(signals.is_empty());
        assert_eq!(s.ledger().total(), 1);
    }

    struct TickObserver {
        ticks: Mutex<Vec<u32>>,
    }

    impl crate::notify::SessionObserver for TickObserver {
        fn violation_warning(
            &self,
            _: crate::violation::ViolationCategory,
            _: u32,
            _: u32,
            _: std::time::Duration,
        ) {
        }

        fn timer_tick(&self, remaining_secs: u32) {
            self.ticks.lock().push(remaining_secs);
        }

        fn session_cancelled(&self, _: &str) {}
    }

    #[tokio::test]
    async fn test_every_tick_notifies_including_zero() {
        let observer = Arc::new(TickObserver {
            ticks: Mutex::new(Vec::new()),
        });
        let mut s = ProctoringSession::start(
            Arc::new(ExamDefinition {
                duration_secs: 3,
                ..(*exam()).clone()
            }),
            student(),
            SessionConfig::default(),
            Arc::new(MemoryGateway::new()),
            Arc::clone(&observer) as Arc<dyn crate::notify::SessionObserver>,
        )
        .await
        .unwrap();

        s.tick();
        s.tick();
        s.tick();
        // Ticks after teardown stay silent
        s.tick();
        assert_eq!(*observer.ticks.lock(), vec![2, 1, 0]);
        assert!(!s.is_active());
    }

    #[tokio::test]
    async fn test_tick_expiry_finalizes() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut s = ProctoringSession::start(
            Arc::new(ExamDefinition {
                duration_secs: 2,
                ..(*exam()).clone()
            }),
            student(),
            SessionConfig::default(),
            Arc::clone(&gateway) as Arc<dyn PersistenceGateway>,
            Arc::new(crate::notify::NullObserver),
        )
        .await
        .unwrap();

        s.tick();
        assert!(s.is_active());
        s.tick();
        assert!(!s.is_active());
        assert_eq!(
            s.attempt().result().unwrap().outcome,
            crate::attempt::ExamOutcome::Expired
        );
    }

    #[tokio::test]
    async fn test_submit_save_failure_is_retryable() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.set_fail_saves(true);
        let mut s = session(Arc::clone(&gateway)).await;

        let err = s.submit().await.unwrap_err();
        assert!(err.is_retryable());
        // Terminal in memory regardless of the failed save
        assert_eq!(s.attempt().lifecycle(), Lifecycle::Submitted);

        gateway.set_fail_saves(false);
        s.retry_save().await.unwrap();
        assert!(s.last_save_error().is_none());
        assert_eq!(gateway.results().len(), 1);
    }
}
