//! Records labelled camera frames into a directory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use super::CamError;
use util::label;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes every `every`th frame to `dir` as `frame_<seq>_angle_<deg>.jpg`.
#[derive(Debug)]
pub struct FrameRecorder {
    dir: PathBuf,

    every: u64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FrameRecorder {
    /// Create a recorder, creating `dir` if needed. `every` of zero records nothing.
    pub fn new<P: AsRef<Path>>(dir: P, every: u64) -> Result<Self, CamError> {
        fs::create_dir_all(dir.as_ref()).map_err(CamError::RecordFailed)?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            every
        })
    }

    /// Whether the frame with sequence number `seq` (starting at 1) should be recorded.
    pub fn should_record(&self, seq: u64) -> bool {
        self.every > 0 && seq % self.every == 0
    }

    /// Path a frame is recorded at.
    pub fn path_for(&self, seq: u64, angle_deg: i32) -> PathBuf {
        let stem = format!("frame_{:06}", seq);
        self.dir.join(label::format_name(&stem, angle_deg, "jpg"))
    }

    /// Record the JPEG frame if it is due, returning the path it was written to.
    pub fn record(
        &self,
        seq: u64,
        angle_deg: i32,
        jpeg: &[u8]
    ) -> Result<Option<PathBuf>, CamError> {
        if !self.should_record(seq) {
            return Ok(None)
        }

        let path = self.path_for(seq, angle_deg);
        fs::write(&path, jpeg).map_err(CamError::RecordFailed)?;

        trace!("Recorded frame {} to {:?}", seq, path);

        Ok(Some(path))
    }
}
