//! Video references and their resolution to on-disk locations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ThumbnailError;

/// A video as named by the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VideoReference {
    /// A file packaged with the application, addressed by its asset identifier.
    BundledAsset(String),
    /// An absolute or relative path on the local filesystem.
    FilesystemPath(String),
}

impl VideoReference {
    /// The reference exactly as the application supplied it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BundledAsset(id) => id,
            Self::FilesystemPath(path) => path,
        }
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only lookup of bundled assets.
///
/// Implementations return the path at which the packaged file actually resides,
/// or `None` if there is no such file.
pub trait AssetLookup: Send + Sync + fmt::Debug {
    /// Find the installed location of `identifier`.
    fn lookup(&self, identifier: &str) -> Option<PathBuf>;
}

impl<T: AssetLookup + ?Sized> AssetLookup for &T {
    fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        (**self).lookup(identifier)
    }
}

impl<T: AssetLookup + ?Sized> AssetLookup for Arc<T> {
    fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        (**self).lookup(identifier)
    }
}

impl<T: AssetLookup + ?Sized> AssetLookup for Box<T> {
    fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        (**self).lookup(identifier)
    }
}

/// An absolute path to a media file, together with the reference it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    path: PathBuf,
    reference: String,
}

impl ResolvedLocation {
    /// Wrap `path`, making it absolute against the working directory.
    ///
    /// This is a lexical operation; the file is not touched.
    pub fn new(path: impl Into<PathBuf>, reference: impl Into<String>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self {
            path,
            reference: reference.into(),
        }
    }

    /// The absolute path to open.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original reference, for diagnostics.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

/// Map `reference` to a concrete location.
///
/// Bundled assets go through `assets`; filesystem paths are used as-is and are
/// only checked for existence when the extractor opens them.
///
/// # Errors
/// Returns [`ThumbnailError::FileNotFound`] if a bundled asset has no on-disk file.
pub fn resolve(
    reference: &VideoReference,
    assets: &dyn AssetLookup,
) -> Result<ResolvedLocation, ThumbnailError> {
    match reference {
        VideoReference::BundledAsset(id) => {
            let path = assets.lookup(id).ok_or_else(|| {
                log::debug!("asset {id} not found in bundle");
                ThumbnailError::FileNotFound(id.clone())
            })?;
            log::trace!("asset {id} resolved to {}", path.display());
            Ok(ResolvedLocation::new(path, id.clone()))
        }
        VideoReference::FilesystemPath(path) => Ok(ResolvedLocation::new(path, path.clone())),
    }
}
