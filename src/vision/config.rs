//! Configuration for matching, timer reading and text recognition

use std::path::PathBuf;

/// How a template is scored against every offset of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMethod {
    /// Zero-mean normalized cross-correlation. Insensitive to brightness
    /// offsets; flat windows score 0.
    ZeroMeanNormalized,
    /// imageproc's normalized cross-correlation (no mean removal).
    CrossCorrelationNormalized,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Threshold for lookups that pass `None` (0.0 to 1.0)
    pub default_threshold: f32,
    /// Scoring method
    pub method: ScoreMethod,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.7,
            method: ScoreMethod::ZeroMeanNormalized,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Pixels brighter than this become background after inversion
    pub binarize_threshold: u8,
    /// Where failing crops are written; `None` disables the dump
    pub diagnostic_dir: Option<PathBuf>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 120,
            diagnostic_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path or name of the tesseract executable
    pub binary: String,
    pub language: String,
    /// Tesseract page segmentation mode; 6 = single uniform block of text
    pub page_seg_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: 6,
        }
    }
}
