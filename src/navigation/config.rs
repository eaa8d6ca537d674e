//! Configuration for navigation, settle times and polling

use std::time::Duration;

/// Template names of the controls the recovery walk looks for
#[derive(Debug, Clone)]
pub struct Markers {
    /// Only visible on the territory screen (its "to map" button)
    pub territory: String,
    /// Map view control that returns to the territory
    pub to_territory: String,
    /// Generic dialog close control
    pub close: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            territory: "button_tomap".to_string(),
            to_territory: "button_toterritory".to_string(),
            close: "button_close".to_string(),
        }
    }
}

/// Whether the checks of one recovery pass share a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSharing {
    /// Fresh screenshot before every check
    PerCheck,
    /// One screenshot for all checks of the pass
    Shared,
}

#[derive(Debug, Clone)]
pub struct SettleTimes {
    /// Wait after every tap
    pub after_tap: Duration,
    /// Extra wait after leaving the map (the screen fades to black)
    pub map_transition: Duration,
    /// Extra wait after closing a dialog
    pub dialog_close: Duration,
    pub swipe_duration_ms: u32,
}

impl Default for SettleTimes {
    fn default() -> Self {
        Self {
            after_tap: Duration::from_secs(1),
            map_transition: Duration::from_secs(2),
            dialog_close: Duration::from_secs(1),
            swipe_duration_ms: 500,
        }
    }
}

/// Bounded retry for waiting on an element to appear
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub max_elapsed: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_factor: u32,
}

impl PollPolicy {
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_factor.max(1))
            .min(self.max_backoff)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            max_elapsed: Duration::from_secs(30),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_factor: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavConfig {
    pub markers: Markers,
    pub marker_threshold: f32,
    pub frame_sharing: FrameSharing,
    pub settle: SettleTimes,
    pub poll: PollPolicy,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            marker_threshold: 0.7,
            frame_sharing: FrameSharing::PerCheck,
            settle: SettleTimes::default(),
            poll: PollPolicy::default(),
        }
    }
}
