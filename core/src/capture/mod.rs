//! Capture contracts: where a photo comes from and how it is cleaned up.

pub mod file;

pub use file::FileCapture;

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("capture source unavailable: {0}")]
    Unavailable(String),
    #[error("reading image dimensions: {0}")]
    Dimensions(#[from] image::ImageError),
    #[error("capture io: {0}")]
    Io(#[from] std::io::Error),
}

/// A photo on disk plus the pixel size it was captured at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    path: PathBuf,
    original_width: u32,
    original_height: u32,
}

impl CapturedImage {
    pub fn new(path: impl Into<PathBuf>, original_width: u32, original_height: u32) -> Self {
        Self {
            path: path.into(),
            original_width,
            original_height,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_width(&self) -> u32 {
        self.original_width
    }

    pub fn original_height(&self) -> u32 {
        self.original_height
    }

    /// Removes the backing file. A file that is already gone is not an error.
    pub fn discard(self) -> Result<(), CaptureError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("discarded capture {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Anything that can hand out a freshly captured image.
pub trait CaptureDevice {
    fn capture(&mut self) -> Result<CapturedImage, CaptureError>;
}
