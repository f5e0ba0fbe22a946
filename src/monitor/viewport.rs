//! Viewport Monitor
//!
//! Heuristics over resize events: orientation flips, large dimension
//! deltas, and dimensions matching the output sizes of common screen
//! capture tools. Debounced only by the natural rate of resize events;
//! a burst of resizes may produce a burst of violations, by contract.

use super::{HostEvent, MonitorError, MonitorSource, ViolationSignal};
use crate::violation::ViolationCategory;

/// Output widths of common capture tools.
const CAPTURE_WIDTHS: &[u32] = &[1920, 1366, 1280, 1024, 800];
/// Output heights of common capture tools.
const CAPTURE_HEIGHTS: &[u32] = &[1080, 768, 800, 600];

pub struct ViewportMonitor {
    delta_threshold: u32,
    prev: Option<(u32, u32, i32)>,
}

impl ViewportMonitor {
    pub fn new(delta_threshold: u32) -> Self {
        Self {
            delta_threshold,
            prev: None,
        }
    }
}

impl MonitorSource for ViewportMonitor {
    fn name(&self) -> &'static str {
        "viewport"
    }

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError> {
        let HostEvent::ViewportResized { width, height, orientation } = event else {
            return Ok(vec![]);
        };

        let mut signals = Vec::new();

        if let Some((prev_w, prev_h, prev_orientation)) = self.prev {
            if *orientation != prev_orientation {
                signals.push(ViolationSignal::new(
                    ViolationCategory::SuspiciousActivity,
                    "Screen orientation changed, possible screenshot attempt",
                ));
            }

            let width_diff = width.abs_diff(prev_w);
            let height_diff = height.abs_diff(prev_h);
            if width_diff > self.delta_threshold || height_diff > self.delta_threshold {
                signals.push(ViolationSignal::new(
                    ViolationCategory::SuspiciousActivity,
                    format!(
                        "Screen size changed ({}x{}), possible screenshot attempt",
                        width_diff, height_diff
                    ),
                ));
            }
        }

        if CAPTURE_WIDTHS.contains(width) && CAPTURE_HEIGHTS.contains(height) {
            signals.push(ViolationSignal::new(
                ViolationCategory::SuspiciousActivity,
                format!("Suspicious screen resolution detected: {}x{}", width, height),
            ));
        }

        self.prev = Some((*width, *height, *orientation));
        Ok(signals)
    }
}
