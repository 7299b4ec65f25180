//! Host-facing defaults.

use std::num::NonZeroU32;

use serde::Deserialize;

use crate::{ThumbnailError, VideoReference};

/// Width used when the host omits `maxWidth` or sends a non-positive value.
pub const DEFAULT_MAX_WIDTH: NonZeroU32 = match NonZeroU32::new(400) {
    Some(width) => width,
    None => unreachable!(),
};

/// References starting with this prefix are looked up as bundled assets.
pub const DEFAULT_ASSET_PREFIX: &str = "assets/";

/// Thumbnail defaults shared by every request of a host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThumbnailConfig {
    /// Fallback for absent or non-positive `maxWidth` values.
    pub default_max_width: NonZeroU32,
    /// Reserved namespace marking bundled asset references.
    pub asset_prefix: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            default_max_width: DEFAULT_MAX_WIDTH,
            asset_prefix: DEFAULT_ASSET_PREFIX.to_owned(),
        }
    }
}

impl ThumbnailConfig {
    /// Parse a configuration from JSON, e.g. `{"defaultMaxWidth": 320}`.
    ///
    /// Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`ThumbnailError::InvalidArguments`] if the JSON is malformed or
    /// `defaultMaxWidth` is zero.
    pub fn from_json(json: &str) -> Result<Self, ThumbnailError> {
        serde_json::from_str(json)
            .map_err(|e| ThumbnailError::InvalidArguments(format!("invalid configuration: {e}")))
    }

    /// Set the fallback width.
    #[must_use]
    pub const fn with_default_max_width(mut self, width: NonZeroU32) -> Self {
        self.default_max_width = width;
        self
    }

    /// Set the asset namespace prefix.
    #[must_use]
    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }

    /// Normalise a host-supplied width.
    ///
    /// Absent and non-positive widths use the default. Widths beyond `u32`
    /// saturate, so they never downscale.
    #[must_use]
    pub fn max_width(&self, requested: Option<i64>) -> NonZeroU32 {
        match requested {
            Some(width) if width > 0 => {
                NonZeroU32::new(u32::try_from(width).unwrap_or(u32::MAX)).unwrap_or(NonZeroU32::MAX)
            }
            _ => self.default_max_width,
        }
    }

    /// Classify a host string as a bundled asset or a filesystem path.
    #[must_use]
    pub fn parse_reference(&self, reference: &str) -> VideoReference {
        if !self.asset_prefix.is_empty() && reference.starts_with(&self.asset_prefix) {
            VideoReference::BundledAsset(reference.to_owned())
        } else {
            VideoReference::FilesystemPath(reference.to_owned())
        }
    }
}
