//! Screen capture.
//!
//! Each output is captured to `<image_dir>/<output>-lock.png` by an external
//! screenshot tool, then blurred in place. The first failure aborts the
//! whole pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info};

use crate::blur::blur_in_place;
use crate::error::{Error, Result};
use crate::outputs::OutputDescriptor;

/// A blurred screenshot ready to be shown on one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockImage {
    /// The output this image was captured from.
    pub output: OutputDescriptor,
    /// Path of the blurred PNG.
    pub path: PathBuf,
}

/// Trait for screenshot tools.
///
/// Implementors write a PNG of the given output to `dest`.
pub trait ScreenCapturer {
    /// Capture one output.
    ///
    /// # Errors
    ///
    /// Returns an error if the screenshot could not be taken.
    fn capture(&self, output: &OutputDescriptor, dest: &Path) -> Result<()>;
}

/// Capturer that runs `grim -o <output> <dest>`.
#[derive(Debug, Clone)]
pub struct GrimCapturer {
    command: String,
}

impl GrimCapturer {
    /// Create a capturer running the given `grim`-compatible command.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ScreenCapturer for GrimCapturer {
    fn capture(&self, output: &OutputDescriptor, dest: &Path) -> Result<()> {
        let status = Command::new(&self.command)
            .arg("-o")
            .arg(&output.name)
            .arg(dest)
            .status()
            .map_err(|e| Error::capture_failed(&output.name, format!("{}: {e}", self.command)))?;

        if !status.success() {
            return Err(Error::capture_failed(
                &output.name,
                format!("{} exited with {status}", self.command),
            ));
        }
        Ok(())
    }
}

/// Path of the lock image for an output.
///
/// Path separators in the output name are replaced so the file always lands
/// directly inside `dir`.
#[must_use]
pub fn lock_image_path(dir: &Path, output: &OutputDescriptor) -> PathBuf {
    let name: String = output
        .name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.join(format!("{name}-lock.png"))
}

/// Capture and blur every output, in order.
///
/// # Errors
///
/// Returns the first capture, decode or encode error. Images produced before
/// the failure are removed again.
pub fn prepare_lock_images(
    outputs: &[OutputDescriptor],
    capturer: &dyn ScreenCapturer,
    dir: &Path,
    blur_sigma: f32,
) -> Result<Vec<LockImage>> {
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut images = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = lock_image_path(dir, output);
        debug!(output = %output, path = %path.display(), "capturing output");
        if let Err(e) = capturer
            .capture(output, &path)
            .and_then(|()| blur_in_place(&path, blur_sigma))
        {
            remove_lock_images(&images);
            return Err(e);
        }
        info!(output = %output, path = %path.display(), "lock image ready");
        images.push(LockImage {
            output: output.clone(),
            path,
        });
    }
    Ok(images)
}

/// Remove lock images, logging (not failing on) files that are already gone.
pub fn remove_lock_images(images: &[LockImage]) {
    for image in images {
        if let Err(e) = std::fs::remove_file(&image.path) {
            debug!(path = %image.path.display(), error = %e, "could not remove lock image");
        }
    }
}
