//! Bundled asset lookups.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::AssetLookup;

/// Assets laid out under a single directory, keyed by their relative path.
///
/// This matches the way Flutter installs `flutter_assets` inside an app bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    /// Look up assets below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Look up assets inside an iOS application bundle.
    pub fn ios_bundle(bundle: impl AsRef<Path>) -> Self {
        Self::new(
            bundle
                .as_ref()
                .join("Frameworks")
                .join("App.framework")
                .join("flutter_assets"),
        )
    }

    /// The directory assets are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLookup for AssetDirectory {
    fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        let relative = Path::new(identifier);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            log::warn!("rejecting asset identifier outside the bundle: {identifier}");
            return None;
        }
        let path = self.root.join(relative);
        path.is_file().then_some(path)
    }
}

/// Errors that can occur while loading an [`AssetManifest`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The manifest is not a JSON object of strings.
    #[error("invalid asset manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// An explicit table from asset identifier to file path.
///
/// Relative entries are resolved against the manifest's base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: HashMap<String, PathBuf>,
    base: Option<PathBuf>,
}

impl AssetManifest {
    /// An empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest like `{"assets/intro.mp4": "videos/intro.mp4"}`.
    ///
    /// # Errors
    /// Returns [`ManifestError::Json`] if `json` is not an object of strings.
    pub fn from_json(json: &str, base: Option<PathBuf>) -> Result<Self, ManifestError> {
        let entries = serde_json::from_str(json)?;
        Ok(Self { entries, base })
    }

    /// Read a manifest file; relative entries resolve against its directory.
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file cannot be read and
    /// [`ManifestError::Json`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let base = path.parent().map(Path::to_path_buf);
        let manifest = Self::from_json(&json, base)?;
        log::debug!(
            "loaded {} asset entries from {}",
            manifest.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with_entry(mut self, identifier: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(identifier.into(), path.into());
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetLookup for AssetManifest {
    fn lookup(&self, identifier: &str) -> Option<PathBuf> {
        let entry = self.entries.get(identifier)?;
        let path = match &self.base {
            Some(base) if entry.is_relative() => base.join(entry),
            _ => entry.clone(),
        };
        path.is_file().then_some(path)
    }
}

/// A lookup for hosts without bundled assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAssets;

impl AssetLookup for NoAssets {
    fn lookup(&self, _identifier: &str) -> Option<PathBuf> {
        None
    }
}
