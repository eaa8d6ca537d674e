// Shared fixtures for unit tests: synthetic images, a scripted device and a
// scripted text recognizer.

use crate::adb::{AdbResult, DeviceDriver};
use crate::vision::{VisionResult, ocr::TextRecognizer, ocr::encode_png};
use image::{GrayImage, Luma};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic noise image; distinct seeds give uncorrelated images
pub fn noise(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(width, height, |_, _| Luma([rng.random::<u8>()]))
}

/// Noise limited to `0..=max` so brightness can be shifted without clipping
pub fn dim_noise(width: u32, height: u32, seed: u64, max: u8) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(width, height, |_, _| Luma([rng.random_range(0..=max)]))
}

pub fn paste(canvas: &mut GrayImage, patch: &GrayImage, x: u32, y: u32) {
    image::imageops::replace(canvas, patch, x as i64, y as i64);
}

pub fn png_bytes(image: &GrayImage) -> Vec<u8> {
    encode_png(image).expect("encode test frame")
}

pub type Swipe = (u32, u32, u32, u32, Option<u32>);

/// Device that replays screenshots in order and records input.
/// The last screenshot repeats once the script runs out. Input is recorded
/// unchecked; bounds are the navigator's job.
pub struct MockDevice {
    frames: Mutex<VecDeque<Vec<u8>>>,
    taps: Mutex<Vec<(u32, u32)>>,
    swipes: Mutex<Vec<Swipe>>,
    captures: Mutex<usize>,
    size: (u32, u32),
}

impl MockDevice {
    pub fn with_frames(frames: Vec<GrayImage>) -> Self {
        let size = frames
            .first()
            .map(|f| f.dimensions())
            .expect("at least one frame");
        Self {
            frames: Mutex::new(frames.iter().map(png_bytes).collect()),
            taps: Mutex::new(Vec::new()),
            swipes: Mutex::new(Vec::new()),
            captures: Mutex::new(0),
            size,
        }
    }

    /// Report a screen size other than the first frame's, as `wm size` does
    /// on a rotated display
    pub fn with_reported_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn taps(&self) -> Vec<(u32, u32)> {
        self.taps.lock().unwrap().clone()
    }

    pub fn swipes(&self) -> Vec<Swipe> {
        self.swipes.lock().unwrap().clone()
    }

    pub fn captures(&self) -> usize {
        *self.captures.lock().unwrap()
    }
}

impl DeviceDriver for MockDevice {
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        *self.captures.lock().unwrap() += 1;
        let mut frames = self.frames.lock().unwrap();
        if frames.len() > 1 {
            Ok(frames.pop_front().unwrap())
        } else {
            Ok(frames.front().cloned().unwrap())
        }
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        self.taps.lock().unwrap().push((x, y));
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
        self.swipes
            .lock()
            .unwrap()
            .push((x1, y1, x2, y2, duration_ms));
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        self.size
    }

    fn device_name(&self) -> &str {
        "mock-device"
    }
}

/// Recognizer that always answers the same text and keeps what it was shown
pub struct ScriptedRecognizer {
    text: String,
    seen: Mutex<Vec<GrayImage>>,
}

impl ScriptedRecognizer {
    pub fn always(text: &str) -> Self {
        Self {
            text: text.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<GrayImage> {
        self.seen.lock().unwrap().clone()
    }
}

impl TextRecognizer for ScriptedRecognizer {
    async fn recognize(&self, image: &GrayImage) -> VisionResult<String> {
        self.seen.lock().unwrap().push(image.clone());
        Ok(self.text.clone())
    }
}
