//! # Camera module
//!
//! Captures frames from the car's camera and records a subset of them, labelled with the
//! steering angle at capture, as training images.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod recorder;

#[cfg(feature = "cam")]
mod monitor;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use recorder::FrameRecorder;

#[cfg(feature = "cam")]
pub use monitor::CamMonitor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CamParams {
    /// Whether the camera is used at all.
    pub enabled: bool,

    /// V4L2 device path, e.g. `/dev/video0`.
    pub device: String,

    /// Capture resolution.
    ///
    /// Units: pixels
    pub resolution: (u32, u32),

    /// Record every nth captured frame. Zero disables recording.
    pub record_every: u64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CamError {
    #[error("Cannot open the camera device {0}: {1}")]
    OpenFailed(String, std::io::Error),

    #[cfg(feature = "cam")]
    #[error("Cannot start capture: {0}")]
    StartFailed(rscam::Error),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(std::io::Error),

    #[error("Cannot record frame: {0}")]
    RecordFailed(std::io::Error)
}

impl Default for CamParams {
    fn default() -> Self {
        Self {
            enabled: false,
            device: String::from("/dev/video0"),
            resolution: (640, 480),
            record_every: 0
        }
    }
}
