//! # Photo Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
pub struct PhotoExecParams {

    /// Directory holding the images under review
    pub data_dir: PathBuf,

    /// Directory deleted and corrupted images are moved into
    pub temp_dir: PathBuf,

    /// Directory for processed images
    pub processed_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let p: PhotoExecParams = util::params::load_from(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/photo_exec.toml")
        ).unwrap();

        assert_eq!(p.data_dir, PathBuf::from("data/images"));
        assert_eq!(p.temp_dir, PathBuf::from("data/temp"));
    }
}
