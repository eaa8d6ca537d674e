use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error(
        "'adb' binary not usable: {reason}. Install Android Platform Tools (https://developer.android.com/tools/adb) or add 'adb' to PATH."
    )]
    AdbNotAvailable { reason: String },

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("No devices found")]
    NoDevices,

    #[error("Device '{serial}' not found after connect. Try: 'adb tcpip 5555'")]
    DeviceNotFound { serial: String },

    #[error("Could not parse screen size from 'wm size' output.")]
    ScreenSizeParseFailed,

    #[error("Tap coordinates are out of bounds: x={x}, y={y}")]
    TapOutOfBounds { x: i64, y: i64 },
}

impl AdbError {
    /// Errors after which the process cannot talk to any device at all.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            AdbError::AdbNotAvailable { .. } | AdbError::NoDevices | AdbError::DeviceNotFound { .. }
        )
    }
}
