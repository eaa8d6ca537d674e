// Core device transport types and traits
use super::error::AdbResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ImageCapture {
    pub bytes: Vec<u8>,
    pub duration_ms: u128,
    pub index: u64, // sequential capture count (per driver instance)
}

// Trait defining what the navigation engine needs from a device.
// Every call is best-effort: the caller owns post-action delays.
#[allow(async_fn_in_trait)]
pub trait DeviceDriver {
    // Raw PNG screenshot bytes
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>>;

    // Default high-level capture with timing
    async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        let start = std::time::Instant::now();
        let bytes = self.screen_capture_bytes().await?;
        let dur = start.elapsed().as_millis();
        Ok(ImageCapture {
            bytes,
            duration_ms: dur,
            index: 0, // Index is assigned by the navigator
        })
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()>;
    async fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> AdbResult<()>;
    fn screen_dimensions(&self) -> (u32, u32);
    fn device_name(&self) -> &str;
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub transport_id: Option<String>,
}
