//! Exam Proctor Core - Session Integrity Engine
//!
//! Embeddable proctoring core for timed multiple-choice exams. The
//! hosting shell forwards raw host events (visibility, clipboard, keys,
//! resizes, DOM mutations); this crate classifies them into violations,
//! enforces warning/penalty/cancellation policy, scores the attempt, and
//! keeps a durable local record.
//!
//! ## Structure
//! - `exam`: exam definitions and student identity
//! - `attempt`: lifecycle state machine and scoring
//! - `violation`: categories, severity table, per-pool ledger
//! - `monitor`: host-event detectors
//! - `session`: the proctoring session and its command loop
//! - `persist`: durable record gateways (JSONL, in-memory)
//! - `notify`: outbound observer surface toward the host UI

pub mod attempt;
pub mod config;
pub mod error;
pub mod exam;
pub mod monitor;
pub mod notify;
pub mod persist;
pub mod session;
pub mod violation;

pub use attempt::{ExamAttempt, ExamOutcome, ExamResult, Lifecycle, Progress};
pub use config::SessionConfig;
pub use error::{ProctorError, ProctorResult};
pub use exam::{ExamDefinition, Question, QuestionId, StudentIdentity};
pub use monitor::{HostEvent, MonitorSource, ViolationSignal};
pub use notify::{NullObserver, SessionObserver};
pub use persist::{CancellationNotice, JsonlGateway, MemoryGateway, PersistenceGateway};
pub use session::{ProctoringSession, SessionCommand, SessionHandle, SessionRunner};
pub use violation::{Severity, ViolationCategory, ViolationPool, ViolationRecord};
