use crate::adb::AdbError;
use crate::navigation::FailureStage;
use crate::vision::VisionError;
use std::time::Duration;
use thiserror::Error;

pub type PilotResult<T> = Result<T, PilotError>;

/// Errors surfaced to automation scripts. Any of these means the device is
/// in an unverified state and the current action should be abandoned.
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Navigation to territory failed: {stage}")]
    Navigation { stage: FailureStage },

    #[error("'{template}' did not appear after {attempts} attempts ({elapsed:?})")]
    Timeout {
        template: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error(transparent)]
    Device(#[from] AdbError),
}

impl PilotError {
    pub fn is_startup_failure(&self) -> bool {
        match self {
            PilotError::Vision(e) => e.is_startup_failure(),
            PilotError::Device(e) => e.is_startup_failure(),
            _ => false,
        }
    }
}
