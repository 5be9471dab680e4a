//! V4L2 camera capture using rscam

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use log::info;
use rscam::{Camera, Config};

use super::{CamError, CamParams, FrameRecorder};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An open camera, polled once per control tick.
///
/// The capture device is released when this is dropped.
pub struct CamMonitor {
    camera: Camera,

    recorder: Option<FrameRecorder>,

    /// Number of frames captured so far.
    seq: u64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CamMonitor {
    /// Open and start the camera. Recorded frames are written into `record_dir`.
    pub fn open(params: &CamParams, record_dir: &Path) -> Result<Self, CamError> {
        let mut camera = Camera::new(&params.device)
            .map_err(|e| CamError::OpenFailed(params.device.clone(), e))?;

        camera.start(&Config {
            interval: (1, 30),
            resolution: params.resolution,
            format: b"MJPG",
            ..Default::default()
        }).map_err(CamError::StartFailed)?;

        let recorder = match params.record_every {
            0 => None,
            n => Some(FrameRecorder::new(record_dir, n)?)
        };

        info!(
            "Camera {} started at {}x{}", 
            params.device, params.resolution.0, params.resolution.1
        );

        Ok(Self {
            camera,
            recorder,
            seq: 0
        })
    }

    /// Capture one frame, recording it if it is due.
    ///
    /// Blocks until the camera delivers the next frame.
    pub fn poll(&mut self, angle_deg: i32) -> Result<Option<PathBuf>, CamError> {
        let frame = self.camera.capture().map_err(CamError::CaptureFailed)?;
        self.seq += 1;

        match &self.recorder {
            Some(r) => r.record(self.seq, angle_deg, &frame[..]),
            None => Ok(None)
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.seq
    }
}
