//! Visibility Monitor
//!
//! Signals once on each visible-to-hidden transition (the student switched
//! away from the exam). Becoming visible again is not itself a violation.
//! Also covers the lock-down surface: leaving fullscreen.

use super::{HostEvent, MonitorError, MonitorSource, ViolationSignal};
use crate::violation::ViolationCategory;

pub struct VisibilityMonitor {
    hidden: bool,
    switch_count: u32,
}

impl VisibilityMonitor {
    pub fn new() -> Self {
        Self {
            hidden: false,
            switch_count: 0,
        }
    }
}

impl Default for VisibilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSource for VisibilityMonitor {
    fn name(&self) -> &'static str {
        "visibility"
    }

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError> {
        match event {
            HostEvent::VisibilityChanged { hidden } => {
                let was_hidden = self.hidden;
                self.hidden = *hidden;
                // Edge-triggered: only the visible -> hidden transition counts
                if *hidden && !was_hidden {
                    self.switch_count += 1;
                    let times = if self.switch_count == 1 { "time" } else { "times" };
                    return Ok(vec![ViolationSignal::new(
                        ViolationCategory::TabSwitch,
                        format!(
                            "Switched away from exam tab ({} {})",
                            self.switch_count, times
                        ),
                    )]);
                }
                Ok(vec![])
            }
            HostEvent::FullscreenChanged { fullscreen } if !fullscreen => {
                Ok(vec![ViolationSignal::new(
                    ViolationCategory::FullscreenExit,
                    "Exited fullscreen during exam",
                )])
            }
            _ => Ok(vec![]),
        }
    }
}
