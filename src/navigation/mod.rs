// Navigation module - screen state recovery and input helpers.
// Built on top of `vision` for perception and `adb` for device input.

pub mod config;
pub mod navigator;
pub mod types;


pub use config::{FrameSharing, Markers, NavConfig, PollPolicy, SettleTimes};
pub use navigator::Navigator;
pub use types::{Capture, FailureStage, NavigationState, Recovery};
