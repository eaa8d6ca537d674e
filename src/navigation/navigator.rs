// Screen navigation driven by template matching
use super::config::{FrameSharing, NavConfig};
use super::types::{Capture, FailureStage, NavigationState, Recovery};
use crate::adb::{AdbError, DeviceDriver};
use crate::error::{PilotError, PilotResult};
use crate::vision::{
    AnchorWindow, Frame, MatchResult, Matcher, Region, TextRecognizer, TimerReader, TimerReading,
    VisionResult,
};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Drives one device: captures frames, finds UI elements and recovers the
/// canonical territory screen. All work runs sequentially on the caller's
/// task; the most recent frame is owned here and only replaced through
/// `&mut self`.
pub struct Navigator<D: DeviceDriver, R: TextRecognizer> {
    device: D,
    matcher: Matcher,
    timer: TimerReader<R>,
    config: NavConfig,
    last_frame: Option<Frame>,
    capture_count: u64,
}

impl<D: DeviceDriver, R: TextRecognizer> Navigator<D, R> {
    pub fn new(device: D, matcher: Matcher, timer: TimerReader<R>, config: NavConfig) -> Self {
        Self {
            device,
            matcher,
            timer,
            config,
            last_frame: None,
            capture_count: 0,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn timer(&self) -> &TimerReader<R> {
        &self.timer
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Take a screenshot and make it the most recent frame
    pub async fn capture(&mut self) -> PilotResult<Frame> {
        let mut cap = self.device.screen_capture().await?;
        self.capture_count += 1;
        cap.index = self.capture_count;
        let frame = Frame::decode(&cap.bytes)?;
        debug!(
            "📸 Screenshot #{} from {} ({}ms, {}x{})",
            cap.index,
            self.device.device_name(),
            cap.duration_ms,
            frame.width(),
            frame.height()
        );
        self.last_frame = Some(frame.clone());
        Ok(frame)
    }

    async fn resolve(&mut self, capture: Capture<'_>) -> PilotResult<Frame> {
        match capture {
            Capture::Fresh => self.capture().await,
            Capture::Last => match &self.last_frame {
                Some(frame) => {
                    debug!(
                        "Reusing screenshot taken {:?} ago",
                        frame.captured_at().elapsed()
                    );
                    Ok(frame.clone())
                }
                None => {
                    debug!("No previous screenshot, capturing one");
                    self.capture().await
                }
            },
            Capture::Frame(frame) => Ok(frame.clone()),
        }
    }

    pub async fn locate(
        &mut self,
        name: &str,
        threshold: impl Into<Option<f32>>,
        capture: Capture<'_>,
    ) -> PilotResult<Option<MatchResult>> {
        let frame = self.resolve(capture).await?;
        Ok(self.matcher.locate(&frame, name, threshold)?)
    }

    pub async fn locate_any(
        &mut self,
        fragment: &str,
        threshold: impl Into<Option<f32>>,
        capture: Capture<'_>,
    ) -> PilotResult<Option<MatchResult>> {
        let frame = self.resolve(capture).await?;
        Ok(self.matcher.locate_any(&frame, fragment, threshold))
    }

    pub async fn read_seconds(
        &mut self,
        region: Region,
        capture: Capture<'_>,
    ) -> PilotResult<TimerReading> {
        let frame = self.resolve(capture).await?;
        Ok(self.timer.read_seconds(&frame, region).await?)
    }

    /// Read a countdown positioned relative to an anchor element, both taken
    /// from the same frame. `Ok(None)` when the anchor is not visible.
    pub async fn remaining_seconds_near(
        &mut self,
        anchor: &str,
        window: &AnchorWindow,
        threshold: impl Into<Option<f32>>,
        capture: Capture<'_>,
    ) -> PilotResult<Option<TimerReading>> {
        let frame = self.resolve(capture).await?;
        let Some(hit) = self.matcher.locate(&frame, anchor, threshold)? else {
            return Ok(None);
        };
        let region = Region::around(hit.center(), window);
        Ok(Some(self.timer.read_seconds(&frame, region).await?))
    }

    fn marker_visible(&self, frame: &Frame, name: &str) -> VisionResult<Option<MatchResult>> {
        self.matcher
            .locate(frame, name, self.config.marker_threshold)
    }

    /// Classify one frame. Checks run in priority order, so a dialog drawn
    /// over the territory still counts as territory.
    pub fn classify(&self, frame: &Frame) -> VisionResult<NavigationState> {
        let markers = &self.config.markers;
        let state = if self.marker_visible(frame, &markers.territory)?.is_some() {
            NavigationState::OnTerritory
        } else if self.marker_visible(frame, &markers.to_territory)?.is_some() {
            NavigationState::OnMap
        } else if self.marker_visible(frame, &markers.close)?.is_some() {
            NavigationState::DialogOpen
        } else {
            NavigationState::Unknown
        };
        debug!("🧭 Screen classified as {state:?}");
        Ok(state)
    }

    /// Capture a frame and classify it
    pub async fn current_state(&mut self) -> PilotResult<NavigationState> {
        let frame = self.capture().await?;
        Ok(self.classify(&frame)?)
    }

    async fn frame_for_next_check(&mut self, current: Frame) -> PilotResult<Frame> {
        match self.config.frame_sharing {
            FrameSharing::PerCheck => self.capture().await,
            FrameSharing::Shared => Ok(current),
        }
    }

    /// Bring the device back to the territory screen.
    ///
    /// Performs at most one corrective tap. A screen with no known control,
    /// or a dialog that does not reveal the territory once closed, is a
    /// navigation failure and nothing further is attempted.
    pub async fn go_to_territory(&mut self) -> PilotResult<Recovery> {
        let markers = self.config.markers.clone();
        let settle = self.config.settle.clone();

        // 1. already on the territory screen
        let frame = self.capture().await?;
        if self.marker_visible(&frame, &markers.territory)?.is_some() {
            return Ok(Self::recovered(Recovery::AlreadyOnTerritory));
        }

        // 2. on the map: go back to the territory
        let frame = self.frame_for_next_check(frame).await?;
        if let Some(hit) = self.marker_visible(&frame, &markers.to_territory)? {
            info!("🗺️ On map, returning to territory");
            self.tap_and_settle(hit.center(), Self::area(&frame), settle.map_transition)
                .await?;
            return Ok(Self::recovered(Recovery::ReturnedFromMap));
        }

        // 3. a dialog is open: close it and confirm the territory shows
        let frame = self.frame_for_next_check(frame).await?;
        let Some(close) = self.marker_visible(&frame, &markers.close)? else {
            warn!("❌ No known control on screen, cannot reach territory");
            return Err(PilotError::Navigation {
                stage: FailureStage::Unrecognized,
            });
        };
        info!("🪟 Dialog open, closing it");
        self.tap_and_settle(close.center(), Self::area(&frame), settle.dialog_close)
            .await?;

        let frame = self.capture().await?;
        if self.marker_visible(&frame, &markers.territory)?.is_some() {
            Ok(Self::recovered(Recovery::DismissedDialog))
        } else {
            warn!("❌ Territory marker missing after closing dialog");
            Err(PilotError::Navigation {
                stage: FailureStage::DialogPersisted,
            })
        }
    }

    fn recovered(recovery: Recovery) -> Recovery {
        info!(
            "🏠 On territory (started {:?}, {} action(s))",
            recovery.starting_state(),
            recovery.actions_taken()
        );
        recovery
    }

    /// Screen area of a frame. Taps use the coordinate space of the frame
    /// they were found in, which follows the display rotation.
    fn area(frame: &Frame) -> Region {
        Region::new(0, 0, frame.width(), frame.height())
    }

    /// Area of the latest screenshot, or the device's reported size before
    /// the first capture
    fn current_area(&self) -> Region {
        match &self.last_frame {
            Some(frame) => Self::area(frame),
            None => {
                let (width, height) = self.device.screen_dimensions();
                Region::new(0, 0, width, height)
            }
        }
    }

    fn ensure_on_screen(area: Region, (x, y): (u32, u32)) -> PilotResult<()> {
        if area.contains_point(x, y) {
            return Ok(());
        }
        warn!(
            "❌ Point ({x}, {y}) outside {}x{} screen",
            area.width, area.height
        );
        Err(AdbError::TapOutOfBounds {
            x: x as i64,
            y: y as i64,
        }
        .into())
    }

    async fn tap_and_settle(
        &self,
        point: (u32, u32),
        area: Region,
        extra: Duration,
    ) -> PilotResult<()> {
        Self::ensure_on_screen(area, point)?;
        let (x, y) = point;
        self.device.tap(x, y).await?;
        debug!("👆 Tap at ({x}, {y})");
        sleep(self.config.settle.after_tap + extra).await;
        Ok(())
    }

    /// Tap a point of the latest screenshot and wait the post-tap settle time
    pub async fn click(&self, x: u32, y: u32) -> PilotResult<()> {
        self.tap_and_settle((x, y), self.current_area(), Duration::ZERO)
            .await
    }

    /// Tap the center of a template shifted by `(dx, dy)`. `Ok(None)` when
    /// the template is not visible; nothing is tapped then.
    pub async fn click_template(
        &mut self,
        name: &str,
        threshold: impl Into<Option<f32>>,
        dx: i32,
        dy: i32,
        capture: Capture<'_>,
    ) -> PilotResult<Option<MatchResult>> {
        let frame = self.resolve(capture).await?;
        let Some(hit) = self.matcher.locate(&frame, name, threshold)? else {
            return Ok(None);
        };
        let x = hit.center_x as i64 + dx as i64;
        let y = hit.center_y as i64 + dy as i64;
        let (x, y) = match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) => (x, y),
            _ => return Err(AdbError::TapOutOfBounds { x, y }.into()),
        };
        self.tap_and_settle((x, y), Self::area(&frame), Duration::ZERO)
            .await?;
        Ok(Some(hit))
    }

    /// Swipe between two points of the latest screenshot, then settle
    pub async fn swipe(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> PilotResult<()> {
        let area = self.current_area();
        Self::ensure_on_screen(area, (x0, y0))?;
        Self::ensure_on_screen(area, (x1, y1))?;
        let settle = &self.config.settle;
        self.device
            .swipe(x0, y0, x1, y1, Some(settle.swipe_duration_ms))
            .await?;
        sleep(settle.after_tap).await;
        Ok(())
    }

    /// Re-capture until `name` appears, backing off between attempts.
    /// Gives up with `PilotError::Timeout` once the poll policy is spent.
    pub async fn wait_for(
        &mut self,
        name: &str,
        threshold: impl Into<Option<f32>>,
    ) -> PilotResult<MatchResult> {
        let threshold = self.matcher.threshold(threshold.into());
        let policy = self.config.poll.clone();
        let started = Instant::now();
        let mut backoff = policy.initial_backoff;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let frame = self.capture().await?;
            if let Some(found) = self.matcher.locate(&frame, name, threshold)? {
                debug!("⏳ '{name}' appeared after {attempts} attempts");
                return Ok(found);
            }
            let elapsed = started.elapsed();
            if attempts >= policy.max_attempts || elapsed >= policy.max_elapsed {
                warn!("⏰ Gave up waiting for '{name}' after {attempts} attempts ({elapsed:?})");
                return Err(PilotError::Timeout {
                    template: name.to_string(),
                    attempts,
                    elapsed,
                });
            }
            // never sleep past the elapsed budget
            sleep(backoff.min(policy.max_elapsed - elapsed)).await;
            backoff = policy.next_backoff(backoff);
        }
    }
}
