//! Monitor Module
//!
//! Independent integrity detectors. The hosting shell normalizes its raw
//! environment events (DOM, keyboard, viewport) into `HostEvent`s and
//! feeds them to the session; each monitor turns the events it cares
//! about into violation-candidate signals. Monitors are constructed fresh
//! per attempt and torn down with the session - never process-wide
//! singletons.
//!
//! ## Structure
//! - `visibility`: tab-switch and fullscreen-exit edges
//! - `clipboard`: copy/cut/paste suppression
//! - `shortcuts`: screenshot/devtools key combinations
//! - `viewport`: resize/orientation capture heuristics
//! - `dom`: overlay/capture-tool node fingerprints

pub mod clipboard;
pub mod dom;
pub mod shortcuts;
pub mod viewport;
pub mod visibility;

pub use clipboard::ClipboardMonitor;
pub use dom::DomMutationMonitor;
pub use shortcuts::InputShortcutMonitor;
pub use viewport::ViewportMonitor;
pub use visibility::VisibilityMonitor;

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::violation::ViolationCategory;

// ============================================================================
// HOST EVENTS
// ============================================================================

/// Clipboard operation reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardOp {
    Copy,
    Cut,
    Paste,
}

/// A key press with modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCombo {
    /// Normalized key name ("s", "4", "PrintScreen", "F12", ...)
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyCombo {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// A DOM node the host observed being inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomNodeInfo {
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// CSS position value ("fixed", "absolute", ...)
    pub position: Option<String>,
    pub z_index: Option<i64>,
}

/// Normalized environment event delivered by the hosting shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HostEvent {
    VisibilityChanged { hidden: bool },
    FullscreenChanged { fullscreen: bool },
    Clipboard { op: ClipboardOp },
    KeyDown { combo: KeyCombo },
    /// Context menu opened with modifier keys held
    ContextMenu { ctrl: bool, shift: bool, meta: bool },
    ViewportResized { width: u32, height: u32, orientation: i32 },
    DomNodeInserted { node: DomNodeInfo },
}

// ============================================================================
// SIGNALS
// ============================================================================

/// A violation candidate produced by a monitor. The detail string carries
/// enough context for a human-readable description; policy never reads it.
#[derive(Debug, Clone)]
pub struct ViolationSignal {
    pub category: ViolationCategory,
    pub detail: String,
    /// The host must suppress the triggering action (clipboard content,
    /// shortcut default) regardless of what happens to this signal.
    pub suppress_default: bool,
}

impl ViolationSignal {
    pub fn new(category: ViolationCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: detail.into(),
            suppress_default: false,
        }
    }

    pub fn suppressing(mut self) -> Self {
        self.suppress_default = true;
        self
    }
}

/// Monitor-internal failure. Isolated per monitor; one failing detector
/// never disables the others.
#[derive(Debug, Clone)]
pub struct MonitorError {
    pub monitor: &'static str,
    pub message: String,
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.monitor, self.message)
    }
}

impl std::error::Error for MonitorError {}

// ============================================================================
// MONITOR SOURCE
// ============================================================================

/// Capability: turn host events into violation-candidate signals.
///
/// `observe` is called for every host event while the attempt is in
/// progress; a monitor returns an empty vec for events it does not care
/// about. A single event may legitimately yield several signals (a resize
/// can trip more than one viewport heuristic).
pub trait MonitorSource: Send {
    fn name(&self) -> &'static str;

    fn observe(&mut self, event: &HostEvent) -> Result<Vec<ViolationSignal>, MonitorError>;
}

/// The standard detector set for a proctored attempt.
pub fn default_monitors(config: &SessionConfig) -> Vec<Box<dyn MonitorSource>> {
    vec![
        Box::new(VisibilityMonitor::new()),
        Box::new(ClipboardMonitor::new()),
        Box::new(InputShortcutMonitor::new()),
        Box::new(ViewportMonitor::new(config.viewport_delta_threshold)),
        Box::new(DomMutationMonitor::new()),
    ]
}
