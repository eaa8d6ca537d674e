//! Screen perception for Android game automation
//!
//! This module turns raw screenshots into answers: where a UI element is
//! (template matching with confidence gating) and how much time a countdown
//! shows (binarization plus text recognition).

pub mod config;
pub mod error;
pub mod frame;
pub mod matcher;
pub mod ocr;
pub mod region;
pub mod score;
pub mod template;
pub mod timer;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use config::{MatchConfig, OcrConfig, ScoreMethod, TimerConfig};
pub use error::{VisionError, VisionResult};
pub use frame::Frame;
pub use matcher::{MatchResult, Matcher};
pub use ocr::{TesseractCli, TextRecognizer};
pub use region::{AnchorWindow, Region};
pub use score::Peak;
pub use template::{Template, TemplateStore};
pub use timer::{TimerReader, TimerReading, parse_countdown};
