//! Rectangular screen regions used for cropping

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region spanning `[x_min, x_max) x [y_min, y_max)`. Inverted bounds give
    /// an empty region.
    pub fn from_bounds(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        Self::new(
            x_min,
            y_min,
            x_max.saturating_sub(x_min),
            y_max.saturating_sub(y_min),
        )
    }

    /// Region placed relative to an anchor point. Offsets that would go left
    /// of or above the screen origin are clamped to 0.
    pub fn around(anchor: (u32, u32), window: &AnchorWindow) -> Self {
        let shift = |base: u32, delta: i32| (base as i64 + delta as i64).max(0) as u32;
        Self::from_bounds(
            shift(anchor.0, window.dx_min),
            shift(anchor.0, window.dx_max),
            shift(anchor.1, window.dy_min),
            shift(anchor.1, window.dy_max),
        )
    }

    /// Clip region to screen boundaries
    pub fn clip_to(&self, screen_width: u32, screen_height: u32) -> Region {
        let x = self.x.min(screen_width);
        let y = self.y.min(screen_height);
        Region {
            x,
            y,
            width: self.width.min(screen_width - x),
            height: self.height.min(screen_height - y),
        }
    }

    /// Check if this region contains a point
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width
            && (y - self.y) < self.height
    }

    /// Get the center point of this region
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Offsets of a crop window from an anchor center, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorWindow {
    pub dx_min: i32,
    pub dx_max: i32,
    pub dy_min: i32,
    pub dy_max: i32,
}

impl Default for AnchorWindow {
    /// Countdown text to the right of the construction gauge
    fn default() -> Self {
        Self {
            dx_min: 150,
            dx_max: 200,
            dy_min: -11,
            dy_max: 11,
        }
    }
}
