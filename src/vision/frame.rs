//! Captured screenshots

use super::error::{VisionError, VisionResult};
use super::region::Region;
use image::GrayImage;
use std::sync::Arc;
use std::time::Instant;

/// One decoded screenshot in single-channel intensity form.
///
/// Cloning shares the pixel buffer, so several lookups can inspect the same
/// frozen device state without copying it.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<GrayImage>,
    captured_at: Instant,
}

impl Frame {
    pub fn from_gray(image: GrayImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: Instant::now(),
        }
    }

    /// Decode PNG/JPEG bytes as returned by `screencap -p`
    pub fn decode(bytes: &[u8]) -> VisionResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(VisionError::FrameDecode)?;
        Ok(Self::from_gray(decoded.to_luma8()))
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Copy of `region` clipped to the frame
    pub fn crop(&self, region: Region) -> VisionResult<GrayImage> {
        let clipped = region.clip_to(self.width(), self.height());
        if !clipped.is_valid() {
            return Err(VisionError::EmptyRegion {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                frame_width: self.width(),
                frame_height: self.height(),
            });
        }
        Ok(image::imageops::crop_imm(
            self.image.as_ref(),
            clipped.x,
            clipped.y,
            clipped.width,
            clipped.height,
        )
        .to_image())
    }
}
