//! First-frame thumbnails for local video files.
//!
//! This crate turns a video reference (a bundled asset identifier or a plain
//! filesystem path) into PNG bytes of the video's first frame, downscaled to a
//! maximum width:
//!
//! 1. [`resolve`] maps a [`VideoReference`] to a [`ResolvedLocation`] through an
//!    injected [`AssetLookup`].
//! 2. [`Extractor`] opens the location with a [`Backend`], decodes the frame at
//!    presentation time zero, applies the track orientation, resizes and encodes.
//!
//! Decoding is pluggable:
//! - **Default**: `FFmpeg` via `ffmpeg-the-third` (the `ffmpeg` feature)
//! - **Fallback**: a stub backend that reports every request as a generation error
//!
//! ```no_run
//! use glasskit_thumbnail::{AssetDirectory, ThumbnailConfig, generate_thumbnail};
//!
//! let assets = AssetDirectory::new("/opt/app/flutter_assets");
//! let png = generate_thumbnail("assets/intro.mp4", Some(320), &assets, &ThumbnailConfig::default())?;
//! std::fs::write("intro.png", png)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod assets;
mod config;
mod encode;
mod extract;
mod frame;
mod source;

/// Platform-specific decode backends.
pub mod sys;

use std::num::NonZeroU32;

pub use assets::{AssetDirectory, AssetManifest, ManifestError, NoAssets};
pub use config::{DEFAULT_ASSET_PREFIX, DEFAULT_MAX_WIDTH, ThumbnailConfig};
pub use encode::encode_png;
pub use extract::{Extractor, Stage};
pub use frame::{DecodedFrame, Frame, Orientation, scaled_size};
pub use source::{AssetLookup, ResolvedLocation, VideoReference, resolve};
pub use sys::{Backend, DefaultBackend, FrameSource, SourceError, StubBackend};

/// Errors returned by thumbnail generation.
///
/// Every failure is terminal for the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThumbnailError {
    /// Required input was missing or malformed.
    #[error("{0}")]
    InvalidArguments(String),
    /// The reference does not point to an existing media file.
    #[error("Video file not found: {0}")]
    FileNotFound(String),
    /// The container could not be read or the first frame could not be decoded.
    #[error("Failed to generate thumbnail: {0}")]
    Generation(String),
    /// The decoded frame could not be encoded to PNG.
    #[error("Failed to encode image to PNG: {0}")]
    Encode(String),
}

impl ThumbnailError {
    /// The wire code reported to the host for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArguments(_) => ErrorCode::InvalidArgs,
            Self::FileNotFound(_) => ErrorCode::FileNotFound,
            Self::Generation(_) => ErrorCode::GenerationError,
            Self::Encode(_) => ErrorCode::EncodeError,
        }
    }
}

/// Error codes understood by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// `INVALID_ARGS`
    InvalidArgs,
    /// `FILE_NOT_FOUND`
    FileNotFound,
    /// `ENCODE_ERROR`
    EncodeError,
    /// `GENERATION_ERROR`
    GenerationError,
}

impl ErrorCode {
    /// The code as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgs => "INVALID_ARGS",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::EncodeError => "ENCODE_ERROR",
            Self::GenerationError => "GENERATION_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    /// Where the video lives.
    pub location: ResolvedLocation,
    /// Frames wider than this are scaled down to exactly this width.
    pub max_width: NonZeroU32,
}

impl ThumbnailRequest {
    /// Create a request for `location`.
    #[must_use]
    pub const fn new(location: ResolvedLocation, max_width: NonZeroU32) -> Self {
        Self {
            location,
            max_width,
        }
    }
}

/// Resolve `reference` and extract its first frame with the default backend.
///
/// `max_width` follows the host convention: absent or non-positive values fall
/// back to [`ThumbnailConfig::default_max_width`].
///
/// # Errors
/// Returns [`ThumbnailError::FileNotFound`] if the reference cannot be resolved
/// or the file is missing, [`ThumbnailError::Generation`] if decoding fails and
/// [`ThumbnailError::Encode`] if PNG encoding fails.
pub fn generate_thumbnail(
    reference: &str,
    max_width: Option<i64>,
    assets: &dyn AssetLookup,
    config: &ThumbnailConfig,
) -> Result<Vec<u8>, ThumbnailError> {
    let reference = config.parse_reference(reference);
    let location = resolve(&reference, assets)?;
    let request = ThumbnailRequest::new(location, config.max_width(max_width));
    Extractor::new(DefaultBackend::default()).extract(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_wire_names() {
        let cases = [
            (ThumbnailError::InvalidArguments("x".into()), "INVALID_ARGS"),
            (ThumbnailError::FileNotFound("x".into()), "FILE_NOT_FOUND"),
            (ThumbnailError::Generation("x".into()), "GENERATION_ERROR"),
            (ThumbnailError::Encode("x".into()), "ENCODE_ERROR"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code().as_str(), code);
            assert_eq!(serde_json::to_value(err.code()).unwrap(), code);
        }
    }

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            ThumbnailError::FileNotFound("assets/missing.mp4".into()).to_string(),
            "Video file not found: assets/missing.mp4"
        );
        assert_eq!(
            ThumbnailError::Generation("no video track".into()).to_string(),
            "Failed to generate thumbnail: no video track"
        );
    }

    #[test]
    fn missing_bundled_asset_is_not_found() {
        let err = generate_thumbnail(
            "assets/nope.mp4",
            None,
            &NoAssets,
            &ThumbnailConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ThumbnailError::FileNotFound("assets/nope.mp4".into()));
    }
}
