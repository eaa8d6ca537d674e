use super::error::{AdbError, AdbResult};
use super::types::{Device, DeviceDriver};
use log::{debug, info, warn};
use std::io::Cursor;
use std::sync::{Mutex, PoisonError};
use tokio::process::Command;

/// Device driver that shells out to the `adb` binary.
///
/// `wm size` reports the natural orientation, which is portrait on phones.
/// Once screenshots arrive their size replaces it, so bounds checks follow
/// the rotation the game actually runs in.
pub struct AdbShell {
    pub device: Device,
    screen: Mutex<(u32, u32)>,
}

impl AdbShell {
    fn ensure_adb_available() -> AdbResult<()> {
        match std::process::Command::new("adb").arg("version").output() {
            Ok(out) => {
                if !out.status.success() {
                    return Err(AdbError::AdbNotAvailable {
                        reason: format!("'adb version' returned non-zero ({})", out.status),
                    });
                }
                Ok(())
            }
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(AdbError::AdbNotAvailable {
                        reason: "binary not found in PATH".to_string(),
                    })
                } else {
                    Err(AdbError::AdbNotAvailable {
                        reason: format!("failed to invoke: {e}"),
                    })
                }
            }
        }
    }

    async fn run_adb(args: &[String]) -> AdbResult<Vec<u8>> {
        let command = format!("adb {}", args.join(" "));
        let output = Command::new("adb")
            .args(args)
            .output()
            .await
            .map_err(|source| AdbError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Arguments addressed at this device (`adb -s <serial> ...`).
    fn device_args(&self, rest: &[String]) -> Vec<String> {
        let mut args = vec!["-s".to_string(), self.device.name.clone()];
        args.extend_from_slice(rest);
        args
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 && parts[1] == "device" {
                    let name = parts[0].to_string();
                    let transport_id = parts
                        .iter()
                        .find_map(|part| part.strip_prefix("transport_id:"))
                        .map(str::to_string);
                    Some(Device { name, transport_id })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Parse `wm size` output. An override size (set with `wm size WxH`) wins
    /// over the physical size because screenshots are taken at that size.
    pub fn parse_screen_size(stdout: &str) -> AdbResult<(u32, u32)> {
        let mut physical = None;
        let mut overridden = None;
        for line in stdout.lines() {
            let line = line.trim();
            let (slot, size_str) = if let Some(rest) = line.strip_prefix("Physical size: ") {
                (&mut physical, rest)
            } else if let Some(rest) = line.strip_prefix("Override size: ") {
                (&mut overridden, rest)
            } else {
                continue;
            };
            if let Some((w, h)) = size_str.trim().split_once('x')
                && let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>())
            {
                *slot = Some((w, h));
            }
        }
        overridden.or(physical).ok_or(AdbError::ScreenSizeParseFailed)
    }

    pub async fn list_devices() -> AdbResult<Vec<Device>> {
        Self::ensure_adb_available()?;
        let stdout = Self::run_adb(&["devices".to_string(), "-l".to_string()]).await?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&stdout)))
    }

    async fn connect_address(address: &str) -> AdbResult<()> {
        let stdout = Self::run_adb(&["connect".to_string(), address.to_string()]).await?;
        let stdout_str = String::from_utf8_lossy(&stdout);
        if stdout_str.contains("Connection refused")
            || stdout_str.contains("failed")
            || stdout_str.contains("cannot")
        {
            return Err(AdbError::CommandFailed {
                command: format!("adb connect {address}"),
                stderr: stdout_str.trim().to_string(),
            });
        }
        info!("🔌 adb connect {address}: {}", stdout_str.trim());
        Ok(())
    }

    async fn get_screen_size(serial: &str) -> AdbResult<(u32, u32)> {
        let stdout = Self::run_adb(&[
            "-s".to_string(),
            serial.to_string(),
            "shell".to_string(),
            "wm".to_string(),
            "size".to_string(),
        ])
        .await?;
        Self::parse_screen_size(&String::from_utf8_lossy(&stdout))
    }

    pub async fn new_with_device(device: Device) -> AdbResult<Self> {
        let (screen_x, screen_y) = Self::get_screen_size(&device.name).await?;
        info!("📱 Device: {} size: {}x{}", device.name, screen_x, screen_y);
        Ok(Self {
            device,
            screen: Mutex::new((screen_x, screen_y)),
        })
    }

    /// Open a device by serial, running `adb connect` first when it is a
    /// network address that is not listed yet.
    pub async fn connect(serial: &str) -> AdbResult<Self> {
        let devices = Self::list_devices().await?;
        if let Some(device) = devices.into_iter().find(|d| d.name == serial) {
            return Self::new_with_device(device).await;
        }
        Self::connect_address(serial).await?;
        let device = Self::list_devices()
            .await?
            .into_iter()
            .find(|d| d.name == serial)
            .ok_or_else(|| AdbError::DeviceNotFound {
                serial: serial.to_string(),
            })?;
        Self::new_with_device(device).await
    }

    /// Open the first listed device. With nothing listed and a fallback
    /// address configured (an emulator, usually), connect to it and retry.
    pub async fn connect_first(fallback: Option<&str>) -> AdbResult<Self> {
        let mut devices = Self::list_devices().await?;
        if devices.is_empty()
            && let Some(address) = fallback
        {
            warn!("⚠️ No adb connected devices, trying to connect {address}");
            Self::connect_address(address).await?;
            devices = Self::list_devices().await?;
        }
        let first = devices.into_iter().next().ok_or(AdbError::NoDevices)?;
        Self::new_with_device(first).await
    }

    fn screen_size(&self) -> (u32, u32) {
        *self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adopt the size of a screenshot as the current screen size
    fn track_screenshot_size(&self, png: &[u8]) {
        let size = image::ImageReader::new(Cursor::new(png))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());
        let Some(size) = size else {
            warn!("⚠️ Could not read screenshot dimensions");
            return;
        };
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if *screen != size {
            info!(
                "🔄 Screen is {}x{} (was {}x{})",
                size.0, size.1, screen.0, screen.1
            );
            *screen = size;
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> AdbResult<()> {
        let (width, height) = self.screen_size();
        if x >= width || y >= height {
            return Err(AdbError::TapOutOfBounds {
                x: x as i64,
                y: y as i64,
            });
        }
        Ok(())
    }
}

impl DeviceDriver for AdbShell {
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        let args = self.device_args(&[
            "exec-out".to_string(),
            "screencap".to_string(),
            "-p".to_string(),
        ]);
        let bytes = Self::run_adb(&args).await?;
        debug!("📸 Captured screenshot ({} bytes)", bytes.len());
        self.track_screenshot_size(&bytes);
        Ok(bytes)
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        self.check_bounds(x, y)?;
        let args = self.device_args(&[
            "shell".to_string(),
            "input".to_string(),
            "tap".to_string(),
            x.to_string(),
            y.to_string(),
        ]);
        Self::run_adb(&args).await?;
        Ok(())
    }

    async fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> AdbResult<()> {
        self.check_bounds(x1, y1)?;
        self.check_bounds(x2, y2)?;
        let mut rest = vec![
            "shell".to_string(),
            "input".to_string(),
            "swipe".to_string(),
            x1.to_string(),
            y1.to_string(),
            x2.to_string(),
            y2.to_string(),
        ];
        if let Some(d) = duration_ms {
            rest.push(d.to_string());
        }
        Self::run_adb(&self.device_args(&rest)).await?;
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        self.screen_size()
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
