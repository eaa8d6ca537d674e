//! Startup: load templates, probe the text recognizer, attach to a device

use crate::adb::{AdbShell, DeviceDriver};
use crate::config::PilotConfig;
use crate::error::PilotResult;
use crate::navigation::Navigator;
use crate::vision::{Matcher, TemplateStore, TesseractCli, TextRecognizer, TimerReader};
use log::info;

/// Wire already constructed parts into a navigator
pub fn assemble<D: DeviceDriver, R: TextRecognizer>(
    device: D,
    store: TemplateStore,
    recognizer: R,
    config: &PilotConfig,
) -> Navigator<D, R> {
    let matcher = Matcher::new(store, config.matching.clone());
    let timer = TimerReader::new(recognizer, config.timer.clone());
    Navigator::new(device, matcher, timer, config.navigation.clone())
}

/// Build a navigator for a real device.
///
/// Cheap local checks run first: an unreadable template directory or a
/// missing `tesseract` fails before `adb` is touched. Every error returned
/// here satisfies `PilotError::is_startup_failure`.
pub async fn connect(config: &PilotConfig) -> PilotResult<Navigator<AdbShell, TesseractCli>> {
    let store = TemplateStore::load_from_directory(&config.template_dir)?;
    let recognizer = TesseractCli::new(&config.ocr)?;

    let device = match &config.adb.serial {
        Some(serial) => AdbShell::connect(serial).await?,
        None => AdbShell::connect_first(config.adb.fallback_address.as_deref()).await?,
    };
    info!(
        "🚀 Ready: {} templates, device {}",
        store.len(),
        device.device_name()
    );

    Ok(assemble(device, store, recognizer, config))
}
