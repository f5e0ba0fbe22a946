//! Session Configuration
//!
//! Policy knobs for a proctored attempt. Can be loaded from a host config
//! file or set at runtime; `Default` matches the production values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session configuration (can be loaded from a host config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Violations allowed per pool before the attempt is cancelled
    pub max_violations_per_pool: u32,
    /// How long the host should display a violation warning (seconds)
    pub warning_display_secs: u64,
    /// Remaining-time deduction per tab switch after the first (seconds)
    pub tab_switch_penalty_secs: u32,
    /// Viewport dimension delta treated as a capture attempt (pixels)
    pub viewport_delta_threshold: u32,
    /// Countdown tick interval (milliseconds)
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_violations_per_pool: 10,
            warning_display_secs: 10,
            tab_switch_penalty_secs: 30,
            viewport_delta_threshold: 100,
            tick_interval_ms: 1000,
        }
    }
}

impl SessionConfig {
    /// Strict mode - fewer strikes, heavier penalties
    pub fn strict() -> Self {
        Self {
            max_violations_per_pool: 3,
            tab_switch_penalty_secs: 60,
            ..Default::default()
        }
    }

    /// Lenient mode - warnings only, no time penalties
    pub fn lenient() -> Self {
        Self {
            max_violations_per_pool: 20,
            tab_switch_penalty_secs: 0,
            ..Default::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn warning_display(&self) -> Duration {
        Duration::from_secs(self.warning_display_secs)
    }
}
