//! Threshold-gated template lookup on captured frames

use super::{
    config::MatchConfig,
    error::{VisionError, VisionResult},
    frame::Frame,
    score::best_match_above,
    template::{Template, TemplateStore},
};
use log::{debug, info};
use serde::Serialize;

/// A template found in a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub template: String,
    /// Center of the matched template, in frame pixels
    pub center_x: u32,
    pub center_y: u32,
    pub score: f32,
}

impl MatchResult {
    pub fn center(&self) -> (u32, u32) {
        (self.center_x, self.center_y)
    }
}

pub struct Matcher {
    store: TemplateStore,
    config: MatchConfig,
}

impl Matcher {
    pub fn new(store: TemplateStore, config: MatchConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The requested threshold, or the configured default when none is given
    pub fn threshold(&self, requested: Option<f32>) -> f32 {
        requested.unwrap_or(self.config.default_threshold)
    }

    fn gated(&self, frame: &Frame, template: &Template, threshold: f32) -> Option<MatchResult> {
        let peak = best_match_above(frame.image(), &template.image, self.config.method, threshold)?;
        let (center_x, center_y) = template.center_at(peak.x, peak.y);
        Some(MatchResult {
            template: template.name.clone(),
            center_x,
            center_y,
            score: peak.score,
        })
    }

    /// Locate the named template. `Ok(None)` means no offset reached the
    /// threshold (`None` uses the configured default); an unknown name is an
    /// error.
    pub fn locate(
        &self,
        frame: &Frame,
        name: &str,
        threshold: impl Into<Option<f32>>,
    ) -> VisionResult<Option<MatchResult>> {
        let threshold = self.threshold(threshold.into());
        let template = self
            .store
            .get(name)
            .ok_or_else(|| VisionError::UnknownTemplate(name.to_string()))?;
        let found = self.gated(frame, template, threshold);
        match &found {
            Some(m) => info!(
                "template match for {name}: {:.2} at ({}, {})",
                m.score, m.center_x, m.center_y
            ),
            None => debug!("template match for {name}: nothing at or above {threshold:.2}"),
        }
        Ok(found)
    }

    /// First template, in store order, whose name contains `fragment` and
    /// whose peak reaches `threshold`.
    pub fn locate_any(
        &self,
        frame: &Frame,
        fragment: &str,
        threshold: impl Into<Option<f32>>,
    ) -> Option<MatchResult> {
        let threshold = self.threshold(threshold.into());
        for template in self.store.grouped(fragment) {
            match self.gated(frame, template, threshold) {
                Some(found) => {
                    info!(
                        "template any match for {fragment}/{}: {:.2}",
                        template.name, found.score
                    );
                    return Some(found);
                }
                None => debug!("template any match for {fragment}/{}: skipped", template.name),
            }
        }
        debug!("👀 No '{fragment}' template reached {threshold:.2}");
        None
    }
}
