// ADB module - device transport over the `adb` command line tool.
// Provides screenshots and touch input; everything else in the crate
// talks to devices through the `DeviceDriver` trait.

pub mod error;
pub mod shell;
pub mod types;

// Re-export the main types for easy access
pub use error::{AdbError, AdbResult};
pub use shell::AdbShell;
pub use types::{Device, DeviceDriver, ImageCapture};
