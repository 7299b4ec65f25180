//! Stub backend for builds without a decoder.
use std::path::Path;

use super::{Backend, FrameSource, SourceError};

/// A backend that cannot decode anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBackend;

impl Backend for StubBackend {
    fn open(&self, _path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        Err(SourceError::Unsupported)
    }
}
