//! Text recognition engine access

use super::config::OcrConfig;
use super::error::{VisionError, VisionResult};
use image::{GrayImage, ImageFormat};
use log::{debug, info};
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Turns an image of text into a string.
#[allow(async_fn_in_trait)]
pub trait TextRecognizer {
    async fn recognize(&self, image: &GrayImage) -> VisionResult<String>;
}

/// Recognizer backed by the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    /// Probe the binary once; a missing engine is fatal at startup.
    pub fn new(config: &OcrConfig) -> VisionResult<Self> {
        let unavailable = |reason: String| VisionError::RecognizerUnavailable {
            binary: config.binary.clone(),
            reason,
        };
        match std::process::Command::new(&config.binary)
            .arg("--version")
            .output()
        {
            Ok(out) if out.status.success() => {
                let banner = String::from_utf8_lossy(&out.stdout);
                info!(
                    "🔤 Text recognizer: {}",
                    banner.lines().next().unwrap_or("tesseract")
                );
                Ok(Self {
                    config: config.clone(),
                })
            }
            Ok(out) => Err(unavailable(format!(
                "'--version' returned non-zero ({})",
                out.status
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(unavailable("binary not found in PATH".to_string()))
            }
            Err(e) => Err(unavailable(e.to_string())),
        }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

/// PNG bytes of a grayscale image
pub fn encode_png(image: &GrayImage) -> VisionResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(VisionError::Encode)?;
    Ok(bytes.into_inner())
}

impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &GrayImage) -> VisionResult<String> {
        let png = encode_png(image)?;
        let failed = |reason: String| VisionError::Recognition { reason };

        let mut child = Command::new(&self.config.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_seg_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to start {}: {e}", self.config.binary)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failed("stdin not captured".to_string()))?;
        stdin
            .write_all(&png)
            .await
            .map_err(|e| failed(format!("failed to send image: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("🔤 Recognized {:?}", text.trim());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_startup_failure() {
        let config = OcrConfig {
            binary: "definitely-not-a-tesseract-binary".to_string(),
            ..OcrConfig::default()
        };
        let err = TesseractCli::new(&config).unwrap_err();
        assert!(matches!(err, VisionError::RecognizerUnavailable { .. }));
        assert!(err.is_startup_failure());
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let image = GrayImage::from_pixel(7, 3, image::Luma([200]));
        let bytes = encode_png(&image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }
}
