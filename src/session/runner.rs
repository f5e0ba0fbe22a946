//! Session Runner
//!
//! Single-consumer command loop around a `ProctoringSession`. Host events,
//! answer updates, and lifecycle requests all arrive on one queue, so
//! monitor callbacks and the countdown timer never race each other.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::attempt::ExamResult;
use crate::exam::QuestionId;
use crate::monitor::HostEvent;

use super::proctor::ProctoringSession;

// ============================================================================
// COMMANDS
// ============================================================================

/// Everything the host can ask of a running session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Raw host event for the monitor set
    Host(HostEvent),
    Answer { question: QuestionId, option: usize },
    ToggleFlag(QuestionId),
    NextQuestion,
    PreviousQuestion,
    JumpTo(usize),
    Submit,
    Cancel(String),
    /// Stop the loop without finalizing the attempt
    Shutdown,
}

// ============================================================================
// HANDLE
// ============================================================================

/// Cloneable sender half. Dropping every handle ends the loop.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Queue a command; false if the loop has already exited.
    pub fn send(&self, command: SessionCommand) -> bool {
        if self.tx.send(command).is_err() {
            log::debug!("session loop gone, command dropped");
            return false;
        }
        true
    }

    pub fn host_event(&self, event: HostEvent) -> bool {
        self.send(SessionCommand::Host(event))
    }

    pub fn answer(&self, question: QuestionId, option: usize) -> bool {
        self.send(SessionCommand::Answer { question, option })
    }

    pub fn submit(&self) -> bool {
        self.send(SessionCommand::Submit)
    }
}

// ============================================================================
// RUNNER
// ============================================================================

pub struct SessionRunner;

impl SessionRunner {
    /// Spawn the loop on the current runtime. The join handle resolves to
    /// the finalized result, or `None` when shut down mid-attempt.
    pub fn spawn(session: ProctoringSession) -> (SessionHandle, JoinHandle<Option<ExamResult>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run(session, rx));
        (SessionHandle { tx }, task)
    }

    /// Drive the session until it reaches a terminal state, the host shuts
    /// it down, or every handle is dropped.
    pub async fn run(
        mut session: ProctoringSession,
        mut rx: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Option<ExamResult> {
        let period = session.config().tick_interval();
        // First tick one full period in, not immediately
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    session.tick();
                }
                command = rx.recv() => {
                    match command {
                        Some(cmd) => Self::handle(&mut session, cmd).await,
                        // All handles dropped
                        None => break,
                    }
                }
            }
            if !session.is_active() {
                break;
            }
        }
        session.teardown();
        session.attempt().result().cloned()
    }

    async fn handle(session: &mut ProctoringSession, command: SessionCommand) {
        match command {
            SessionCommand::Host(event) => {
                session.handle_event(&event);
            }
            SessionCommand::Answer { question, option } => {
                session.attempt_mut().record_answer(&question, option);
            }
            SessionCommand::ToggleFlag(question) => {
                session.attempt_mut().toggle_flag(&question);
            }
            SessionCommand::NextQuestion => session.attempt_mut().next_question(),
            SessionCommand::PreviousQuestion => session.attempt_mut().previous_question(),
            SessionCommand::JumpTo(index) => session.attempt_mut().jump_to(index),
            SessionCommand::Submit => {
                if let Err(e) = session.submit().await {
                    log::error!("submit save failed, result retained locally: {}", e);
                }
            }
            SessionCommand::Cancel(reason) => session.cancel(&reason),
            SessionCommand::Shutdown => session.teardown(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
