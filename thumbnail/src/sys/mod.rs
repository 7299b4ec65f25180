//! Decode backends.
//!
//! A [`Backend`] opens a media file and hands out a [`FrameSource`] that can
//! decode exactly one frame: the one at presentation time zero. The extractor
//! only talks to these traits, so a platform media framework can replace the
//! default software decoder without touching the pipeline.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::{Frame, Orientation};

mod container;
mod stub;
#[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
mod timing;

pub use container::track_orientation;
pub use stub::StubBackend;

cfg_if::cfg_if! {
    if #[cfg(feature = "ffmpeg")] {
        mod ffmpeg;
        pub use self::ffmpeg::{FfmpegBackend, FfmpegSource};

        /// The backend used when none is specified.
        pub type DefaultBackend = FfmpegBackend;
    } else {
        /// The backend used when none is specified.
        pub type DefaultBackend = StubBackend;
    }
}

/// Errors reported by decode backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// There is no file at the given path.
    #[error("no such file: {0}")]
    NotFound(String),
    /// The file exists but is not a readable media container.
    #[error("failed to open media: {0}")]
    Open(String),
    /// The container opened but the frame at time zero could not be decoded.
    #[error("{0}")]
    Decode(String),
    /// No decoder is compiled in for this platform.
    #[error("no video backend available")]
    Unsupported,
}

/// An opened media file.
///
/// Dropping the source releases the container and decoder.
pub trait FrameSource {
    /// The transform stored in the video track.
    fn orientation(&self) -> Orientation;

    /// Decode the frame at presentation time zero, with zero tolerance.
    ///
    /// # Errors
    /// Returns [`SourceError::Decode`] if the stream is corrupt, the codec is
    /// unsupported, the media is empty, or the first frame is not at time zero.
    fn decode_frame_at_zero(&mut self) -> Result<Frame, SourceError>;
}

/// Opens media files for decoding.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Open `path` as a media container.
    ///
    /// # Errors
    /// Returns [`SourceError::Open`] if the file is not a readable container.
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError>;
}

impl<T: Backend + ?Sized> Backend for &T {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        (**self).open(path)
    }
}

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        (**self).open(path)
    }
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        (**self).open(path)
    }
}
