//! Input Shortcut Monitor
//!
//! Recognizes OS screenshot shortcuts and devtools-opening combinations
//! and suppresses their default action:
//! - Win: Win/Ctrl+Shift+S, PrintScreen
//! - Mac: Cmd+Shift+3/4/5
//! - Devtools: F12, Ctrl+Shift+I, Ctrl+Shift+J
//! - Modifier-laden context menu opens

use super::{HostEvent, KeyCombo, MonitorError, MonitorSource, ViolationSignal};
use crate::violation::ViolationCategory;

pub struct InputShortcutMonitor;

impl InputShortcutMonitor {
    pub fn new() -> Self {
        Self
    }

    fn is_capture_shortcut(combo: &KeyCombo) -> bool {
        let key = combo.key.as_str();
        // Snipping tool: (Ctrl|Cmd)+Shift+S
        (key.eq_ignore_ascii_case("s") && combo.shift && (combo.meta || combo.ctrl))
            // Mac capture: Cmd+Shift+3/4/5
            || (matches!(key, "3" | "4" | "5") && combo.shift && combo.meta)
            || key == "PrintScreen"
            // Devtools
            || key == "F12"
            || (combo.ctrl && combo.shift && matches!(key, "I" | "J" | "i" | "j"))
    }
}

impl Default for InputShortcutMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSource for InputShortcutMonitor {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError> {
        match event {
            HostEvent::KeyDown { combo } if Self::is_capture_shortcut(combo) => {
                Ok(vec![ViolationSignal::new(
                    ViolationCategory::SuspiciousActivity,
                    format!(
                        "Attempted to take a screenshot using {} key combination",
                        combo.key
                    ),
                )
                .suppressing()])
            }
            HostEvent::ContextMenu { ctrl, shift, meta } if *shift && (*ctrl || *meta) => {
                Ok(vec![ViolationSignal::new(
                    ViolationCategory::SuspiciousActivity,
                    "Attempted to take a screenshot via context menu",
                )
                .suppressing()])
            }
            _ => Ok(vec![]),
        }
    }
}
