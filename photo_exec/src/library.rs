//! # Photo library
//!
//! The set of images under review in the data directory. Images can be stepped through, deleted
//! and restored. Deleting never removes a file from disk, it is moved into the temp directory,
//! which is also where images that fail to decode are quarantined.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    fs,
    io,
    path::{Path, PathBuf}
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::dist::AngleDistribution;
use crate::params::PhotoExecParams;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Extensions, in lower case, of the files considered images.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct PhotoLibrary {
    data_dir: PathBuf,
    temp_dir: PathBuf,

    /// Names of the valid images in `data_dir`, sorted.
    files: Vec<String>,

    /// Index of the current image in `files`, zero when the library is empty.
    index: usize
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Cannot create directory {0:?}: {1}")]
    CreateDir(PathBuf, io::Error),

    #[error("Cannot list directory {0:?}: {1}")]
    ReadDir(PathBuf, io::Error),

    #[error("Cannot move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PhotoLibrary {

    /// Open the library, creating missing directories and listing the images.
    pub fn open(params: &PhotoExecParams) -> Result<Self, LibraryError> {
        for dir in [&params.data_dir, &params.temp_dir, &params.processed_dir].iter() {
            fs::create_dir_all(dir)
                .map_err(|e| LibraryError::CreateDir(dir.to_path_buf(), e))?;
        }

        let mut lib = Self {
            data_dir: params.data_dir.clone(),
            temp_dir: params.temp_dir.clone(),
            files: Vec::new(),
            index: 0
        };

        lib.refresh()?;

        Ok(lib)
    }

    /// Re-list the data directory.
    ///
    /// Images which fail to decode are moved to the temp directory. Returns the names of the
    /// images quarantined by this call.
    pub fn refresh(&mut self) -> Result<Vec<String>, LibraryError> {
        let mut names = list_images(&self.data_dir)?;
        let mut quarantined = Vec::new();

        names.retain(|name| {
            let path = self.data_dir.join(name);
            if is_decodable(&path) {
                return true
            }

            match move_file(&path, &self.temp_dir.join(name)) {
                Ok(()) => {
                    warn!("{} is corrupted, moved to {:?}", name, self.temp_dir);
                    quarantined.push(name.clone());
                },
                Err(e) => warn!("{} is corrupted and could not be quarantined: {}", name, e)
            }

            false
        });

        self.files = names;
        self.index = self.index.min(self.files.len().saturating_sub(1));

        debug!("Listed {} images in {:?}", self.files.len(), self.data_dir);

        Ok(quarantined)
    }

    /// Move the current image into the temp directory.
    ///
    /// Returns the name of the moved image, or `None` if the library is empty.
    pub fn delete_current(&mut self) -> Result<Option<String>, LibraryError> {
        let name = match self.files.get(self.index) {
            Some(n) => n.clone(),
            None => return Ok(None)
        };

        move_file(&self.data_dir.join(&name), &self.temp_dir.join(&name))?;
        info!("Deleted {}", name);

        self.refresh()?;

        Ok(Some(name))
    }

    /// Move every file in the temp directory back into the data directory.
    ///
    /// Returns the number of files moved. A file which can't be moved is left in the temp
    /// directory and the rest are still restored. The listing is refreshed either way, then the
    /// first failure is returned.
    pub fn restore_all(&mut self) -> Result<usize, LibraryError> {
        let entries = fs::read_dir(&self.temp_dir)
            .map_err(|e| LibraryError::ReadDir(self.temp_dir.clone(), e))?;

        let mut count = 0;
        let mut failure = None;
        for entry in entries {
            let res = match entry {
                Ok(e) if e.path().is_file() => {
                    move_file(&e.path(), &self.data_dir.join(e.file_name())).map(|_| true)
                },
                Ok(_) => Ok(false),
                Err(e) => Err(LibraryError::ReadDir(self.temp_dir.clone(), e))
            };

            match res {
                Ok(true) => count += 1,
                Ok(false) => (),
                Err(e) => {
                    warn!("{}", e);
                    failure.get_or_insert(e);
                }
            }
        }

        info!("Restored {} files from {:?}", count, self.temp_dir);

        self.refresh()?;

        match failure {
            Some(e) => Err(e),
            None => Ok(count)
        }
    }

    /// Step to the next image, returns `false` if already at the last one.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.files.len() {
            self.index += 1;
            true
        }
        else {
            false
        }
    }

    /// Step to the previous image, returns `false` if already at the first one.
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        }
        else {
            false
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.files.get(self.index).map(|s| s.as_str())
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current().map(|n| self.data_dir.join(n))
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn distribution(&self) -> AngleDistribution {
        AngleDistribution::from_names(self.files.iter().map(|s| s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Whether the file name has one of the [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_image_name(name: &str) -> bool {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)),
        None => false
    }
}

/// Fully decode the image to check it is intact.
pub fn is_decodable(path: &Path) -> bool {
    let reader = match image::io::Reader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(r) => r,
        Err(_) => return false
    };

    reader.decode().is_ok()
}

/// Sorted names of the image files directly inside `dir`.
fn list_images(dir: &Path) -> Result<Vec<String>, LibraryError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| LibraryError::ReadDir(dir.to_path_buf(), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LibraryError::ReadDir(dir.to_path_buf(), e))?;
        if !entry.path().is_file() {
            continue
        }

        // Names which aren't valid unicode can't carry an angle label
        if let Some(name) = entry.file_name().to_str() {
            if is_image_name(name) {
                names.push(name.to_string());
            }
        }
    }

    names.sort();

    Ok(names)
}

/// Move a file, falling back to copy and remove when a rename isn't possible (e.g. across
/// filesystems).
fn move_file(from: &Path, to: &Path) -> Result<(), LibraryError> {
    let map = |source| LibraryError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source
    };

    if fs::rename(from, to).is_ok() {
        return Ok(())
    }

    fs::copy(from, to).map_err(map)?;
    fs::remove_file(from).map_err(map)
}
