use super::{CaptureDevice, CaptureError, CapturedImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Capture device backed by an existing image file.
///
/// Each capture copies the source into the spool directory so that
/// discarding the capture never touches the original.
pub struct FileCapture {
    source: PathBuf,
    spool_dir: PathBuf,
    sequence: u64,
}

impl FileCapture {
    pub fn new(source: impl Into<PathBuf>, spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            spool_dir: spool_dir.into(),
            sequence: 0,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<PathBuf>) {
        self.source = source.into();
    }

    fn spool_path(&self) -> PathBuf {
        let extension = self
            .source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        self.spool_dir
            .join(format!("capture-{:04}.{}", self.sequence, extension))
    }
}

impl CaptureDevice for FileCapture {
    fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        if !self.source.is_file() {
            return Err(CaptureError::Unavailable(format!(
                "{} is not a file",
                self.source.display()
            )));
        }
        let (width, height) = image::image_dimensions(&self.source)?;
        fs::create_dir_all(&self.spool_dir)?;
        self.sequence += 1;
        let target = self.spool_path();
        fs::copy(&self.source, &target)?;
        log::info!(
            "captured {} ({}x{}) into {}",
            self.source.display(),
            width,
            height,
            target.display()
        );
        Ok(CapturedImage::new(target, width, height))
    }
}
