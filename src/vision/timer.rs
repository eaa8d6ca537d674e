//! Countdown timer reading (`MM:SS`) from a screen region

use super::{
    config::TimerConfig,
    error::VisionResult,
    frame::Frame,
    ocr::TextRecognizer,
    region::Region,
};
use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};
use log::{info, warn};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTDOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2}):([0-9]{2})").expect("countdown pattern is valid")
});

/// Outcome of one timer read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TimerReading {
    Remaining(u32),
    /// No `MM:SS` in the recognized text
    Unreadable { text: String },
}

impl TimerReading {
    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimerReading::Remaining(secs) => Some(*secs),
            TimerReading::Unreadable { .. } => None,
        }
    }

    /// Seconds, or `fallback` when unreadable. Callers that poll a build
    /// usually pass a very large value so an unreadable timer never looks
    /// like an almost finished one.
    pub fn seconds_or(&self, fallback: u32) -> u32 {
        self.seconds().unwrap_or(fallback)
    }
}

/// Total seconds of the first `MM:SS` in `text`. Seconds above 59 make the
/// text malformed rather than being carried into minutes.
pub fn parse_countdown(text: &str) -> Option<u32> {
    let caps = COUNTDOWN.captures(text)?;
    let minutes: u32 = caps[1].parse().ok()?;
    let seconds: u32 = caps[2].parse().ok()?;
    if seconds > 59 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// Dark text on a light background: pixels above `level` become black.
pub fn binarize(crop: &GrayImage, level: u8) -> GrayImage {
    threshold(crop, level, ThresholdType::BinaryInverted)
}

pub struct TimerReader<R: TextRecognizer> {
    recognizer: R,
    config: TimerConfig,
}

impl<R: TextRecognizer> TimerReader<R> {
    pub fn new(recognizer: R, config: TimerConfig) -> Self {
        Self { recognizer, config }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Read the countdown shown in `region` of `frame`
    pub async fn read_seconds(&self, frame: &Frame, region: Region) -> VisionResult<TimerReading> {
        let crop = frame.crop(region)?;
        let prepared = binarize(&crop, self.config.binarize_threshold);
        let text = self.recognizer.recognize(&prepared).await?;

        match parse_countdown(&text) {
            Some(secs) => {
                info!("remaining time: {:02}:{:02}", secs / 60, secs % 60);
                Ok(TimerReading::Remaining(secs))
            }
            None => {
                warn!("⚠️ time could not be determined from {:?}", text.trim());
                if let Some(dir) = &self.config.diagnostic_dir {
                    dump_failure(dir, &prepared);
                }
                Ok(TimerReading::Unreadable { text })
            }
        }
    }
}

fn dump_failure(dir: &Path, image: &GrayImage) {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = dir.join(format!("timer-failure-{millis}.png"));
    match image.save(&path) {
        Ok(()) => info!("💾 Saved failing timer crop to {}", path.display()),
        Err(e) => warn!("⚠️ Could not save timer crop to {}: {e}", path.display()),
    }
}
