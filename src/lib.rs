//! Perception and navigation engine for automating an Android game over ADB.
//!
//! Screenshots come from a [`adb::DeviceDriver`], UI elements are found by
//! template matching in [`vision`], countdowns are read with text
//! recognition, and [`navigation::Navigator`] ties it together to bring the
//! game back to its territory screen.

pub mod adb;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod navigation;
pub mod vision;

#[cfg(test)]
mod test_support;

pub use adb::{AdbError, AdbShell, DeviceDriver};
pub use config::{AdbConfig, PilotConfig};
pub use error::{PilotError, PilotResult};
pub use navigation::{
    Capture, FailureStage, FrameSharing, NavConfig, NavigationState, Navigator, Recovery,
};
pub use vision::{
    Frame, MatchResult, Matcher, Region, TemplateStore, TesseractCli, TextRecognizer,
    TimerReading, VisionError,
};
