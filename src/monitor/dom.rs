//! DOM Mutation Monitor
//!
//! Fingerprints newly inserted DOM nodes against known overlay/capture
//! tooling: id or class containing a capture-related substring, or a
//! fixed-position node with an unusually high stacking order. Inherently
//! best-effort - the false-positive rate is a known limitation, and the
//! contract is only that it can fire on known fixtures.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DomNodeInfo, HostEvent, MonitorError, MonitorSource, ViolationSignal};
use crate::violation::ViolationCategory;

/// Id/class substrings associated with capture tooling.
static CAPTURE_FINGERPRINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)screenshot|screen[-_]?capture|snip").expect("valid fingerprint regex")
});

/// Fixed-position overlays at or above this stacking order are suspect.
const OVERLAY_Z_INDEX: i64 = 999_999;

pub struct DomMutationMonitor;

impl DomMutationMonitor {
    pub fn new() -> Self {
        Self
    }

    fn matches_fingerprint(node: &DomNodeInfo) -> bool {
        let named_like_capture_tool = node
            .id
            .as_deref()
            .map(|s| CAPTURE_FINGERPRINT.is_match(s))
            .unwrap_or(false)
            || node
                .class_name
                .as_deref()
                .map(|s| CAPTURE_FINGERPRINT.is_match(s))
                .unwrap_or(false);

        let high_fixed_overlay = node.position.as_deref() == Some("fixed")
            && node.z_index.map(|z| z >= OVERLAY_Z_INDEX).unwrap_or(false);

        named_like_capture_tool || high_fixed_overlay
    }
}

impl Default for DomMutationMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSource for DomMutationMonitor {
    fn name(&self) -> &'static str {
        "dom_mutation"
    }

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError> {
        let HostEvent::DomNodeInserted { node } = event else {
            return Ok(vec![]);
        };
        if Self::matches_fingerprint(node) {
            return Ok(vec![ViolationSignal::new(
                ViolationCategory::SuspiciousActivity,
                "Suspected screenshot tool detected",
            )]);
        }
        Ok(vec![])
    }
}
