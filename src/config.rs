//! Top level configuration assembled from defaults and environment variables

use crate::navigation::NavConfig;
use crate::vision::{MatchConfig, OcrConfig, TimerConfig};
use log::{debug, warn};
use std::path::PathBuf;

/// Emulator address tried when no device is attached
pub const DEFAULT_FALLBACK_ADDRESS: &str = "127.0.0.1:62001";

#[derive(Debug, Clone)]
pub struct AdbConfig {
    /// Device to address; the first listed device when unset
    pub serial: Option<String>,
    /// Address passed to `adb connect` when no device is listed
    pub fallback_address: Option<String>,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            serial: None,
            fallback_address: Some(DEFAULT_FALLBACK_ADDRESS.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PilotConfig {
    pub template_dir: PathBuf,
    pub adb: AdbConfig,
    pub matching: MatchConfig,
    pub timer: TimerConfig,
    pub ocr: OcrConfig,
    pub navigation: NavConfig,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./imgs"),
            adb: AdbConfig::default(),
            matching: MatchConfig::default(),
            timer: TimerConfig::default(),
            ocr: OcrConfig::default(),
            navigation: NavConfig::default(),
        }
    }
}

impl PilotConfig {
    /// Defaults overlaid with `PILOT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("PILOT_TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(dir);
        }
        if let Some(serial) = get("PILOT_ADB_SERIAL") {
            config.adb.serial = Some(serial);
        }
        if let Some(address) = get("PILOT_ADB_FALLBACK") {
            // "none" disables the emulator fallback
            config.adb.fallback_address = if address.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(address)
            };
        }
        if let Some(raw) = get("PILOT_THRESHOLD") {
            match raw.trim().parse::<f32>() {
                Ok(value) if (0.0..=1.0).contains(&value) => {
                    config.matching.default_threshold = value;
                    config.navigation.marker_threshold = value;
                }
                _ => warn!("⚠️ Ignoring PILOT_THRESHOLD={raw:?}, expected a number in 0..=1"),
            }
        }
        if let Some(dir) = get("PILOT_DIAGNOSTIC_DIR") {
            config.timer.diagnostic_dir = Some(PathBuf::from(dir));
        }
        if let Some(binary) = get("PILOT_TESSERACT") {
            config.ocr.binary = binary;
        }

        debug!("Configuration: {config:?}");
        config
    }
}
