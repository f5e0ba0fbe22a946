//! Session Observer
//!
//! Outbound notification surface toward the hosting UI. The core calls
//! out; rendering (warning banners, countdown display, cancellation
//! screen) is entirely the collaborator's problem. Observers must not
//! block - they run inline with event processing.

use std::time::Duration;

use crate::error::ProctorError;
use crate::violation::ViolationCategory;

pub trait SessionObserver: Send + Sync {
    /// A violation was counted. `display_for` is how long the host should
    /// keep the warning on screen before auto-dismissing.
    fn violation_warning(
        &self,
        category: ViolationCategory,
        count: u32,
        max: u32,
        display_for: Duration,
    );

    /// One countdown tick elapsed.
    fn timer_tick(&self, remaining_secs: u32);

    /// The attempt was cancelled by policy.
    fn session_cancelled(&self, reason: &str);

    /// A durable save failed after the attempt reached its terminal
    /// state; the host should offer a retry of the save.
    fn save_failed(&self, error: &ProctorError) {
        log::error!("durable save failed: {}", error);
    }
}

/// Observer that drops everything. Useful for headless tests and batch
/// replays.
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn violation_warning(&self, _: ViolationCategory, _: u32, _: u32, _: Duration) {}

    fn timer_tick(&self, _: u32) {}

    fn session_cancelled(&self, reason: &str) {
        log::info!("session cancelled: {}", reason);
    }
}
