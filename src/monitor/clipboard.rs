//! Clipboard Monitor
//!
//! Copy, cut, and paste are never allowed during an attempt. The action is
//! always suppressed (signal `suppress_default`) whether or not the
//! violation record makes it to the store.

use super::{ClipboardOp, HostEvent, MonitorError, MonitorSource, ViolationSignal};
use crate::violation::ViolationCategory;

pub struct ClipboardMonitor;

impl ClipboardMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClipboardMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSource for ClipboardMonitor {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError> {
        let HostEvent::Clipboard { op } = event else {
            return Ok(vec![]);
        };
        let signal = match op {
            ClipboardOp::Copy => ViolationSignal::new(
                ViolationCategory::CopyAttempt,
                "Attempted to copy exam content",
            ),
            ClipboardOp::Cut => ViolationSignal::new(
                ViolationCategory::CopyAttempt,
                "Attempted to cut exam content",
            ),
            ClipboardOp::Paste => ViolationSignal::new(
                ViolationCategory::PasteAttempt,
                "Attempted to paste content during exam",
            ),
        };
        Ok(vec![signal.suppressing()])
    }
}
