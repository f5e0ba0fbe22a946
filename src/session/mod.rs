//! Session Layer
//!
//! ## Structure
//! - `proctor`: one attempt wired to its monitors, ledger, and store
//! - `runner`: single-consumer command loop and host-facing handle

pub mod proctor;
pub mod runner;

pub use proctor::ProctoringSession;
pub use runner::{SessionCommand, SessionHandle, SessionRunner};
