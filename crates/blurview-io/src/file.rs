//! Decoding image files from disk.
//!
//! Reads the whole file and hands the bytes to the codec backend, sorting
//! failures into the four cases the session reports: missing file,
//! unreadable or corrupt data, unsupported format, and empty image.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blurview_pipeline::{CodecBackend, PipelineError, PixelBuffer};

/// Why a file could not be opened as an image.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// No file exists at the path.
    #[error("{}: file not found", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read, or its contents are corrupt.
    #[error("{}: {reason}", path.display())]
    Unreadable {
        /// The file that failed.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The file is an image format this build does not accept.
    #[error("{}: unsupported image format ({reason})", path.display())]
    Unsupported {
        /// The file that failed.
        path: PathBuf,
        /// The detected format or decoder message.
        reason: String,
    },

    /// The file decoded to an image with zero width or height.
    #[error("{}: image is empty", .0.display())]
    Empty(PathBuf),
}

impl OpenError {
    /// Path of the file that failed to open.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::Empty(path) => path,
            Self::Unreadable { path, .. } | Self::Unsupported { path, .. } => path,
        }
    }

    fn from_pipeline(path: &Path, err: PipelineError) -> Self {
        let path = path.to_path_buf();
        match err {
            PipelineError::EmptyImage { .. } => Self::Empty(path),
            PipelineError::UnsupportedFormat(reason) => Self::Unsupported { path, reason },
            PipelineError::EmptyInput => Self::Unreadable {
                path,
                reason: "file is empty".to_owned(),
            },
            other => Self::Unreadable {
                path,
                reason: other.to_string(),
            },
        }
    }
}

/// Decode the image file at `path` into a BGR buffer.
///
/// # Errors
///
/// Returns [`OpenError::NotFound`] if the file does not exist,
/// [`OpenError::Unreadable`] if it cannot be read or decoded,
/// [`OpenError::Unsupported`] for formats outside the backend's list, and
/// [`OpenError::Empty`] if the decoded image has a zero dimension.
pub fn decode_file(path: &Path, backend: &CodecBackend) -> Result<PixelBuffer, OpenError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => OpenError::NotFound(path.to_path_buf()),
        _ => OpenError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    backend
        .decode(&bytes)
        .map_err(|e| OpenError::from_pipeline(path, e))
}
