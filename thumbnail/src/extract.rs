//! The first-frame pipeline.

use std::fmt;

use crate::{
    Backend, DecodedFrame, ResolvedLocation, SourceError, ThumbnailError, ThumbnailRequest,
    encode_png,
};

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the container.
    Opening,
    /// Decoding the frame at time zero.
    Decoding,
    /// Fitting the frame to the maximum width.
    Resizing,
    /// Encoding to PNG.
    Encoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Opening => "opening",
            Self::Decoding => "decoding",
            Self::Resizing => "resizing",
            Self::Encoding => "encoding",
        })
    }
}

/// Extracts first-frame thumbnails with a decode [`Backend`].
///
/// Each call opens its own source; nothing is cached or shared between calls.
#[derive(Debug, Clone, Default)]
pub struct Extractor<B> {
    backend: B,
}

impl<B: Backend> Extractor<B> {
    /// Create an extractor on top of `backend`.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Run the pipeline for `request`.
    ///
    /// The pipeline is strictly linear: the first failing stage ends the call.
    ///
    /// # Errors
    /// - [`ThumbnailError::FileNotFound`] if nothing exists at the location.
    /// - [`ThumbnailError::Generation`] if the container cannot be opened or the
    ///   frame at time zero cannot be decoded.
    /// - [`ThumbnailError::Encode`] if PNG encoding fails.
    pub fn extract(&self, request: &ThumbnailRequest) -> Result<Vec<u8>, ThumbnailError> {
        let location = &request.location;
        let result = self.run(location, request);
        match &result {
            Ok(png) => log::debug!(
                "thumbnail for {} done ({} bytes)",
                location.reference(),
                png.len()
            ),
            Err(e) => log::warn!("thumbnail for {} failed: {e}", location.reference()),
        }
        result
    }

    fn run(
        &self,
        location: &ResolvedLocation,
        request: &ThumbnailRequest,
    ) -> Result<Vec<u8>, ThumbnailError> {
        let path = location.path();

        trace_stage(Stage::Opening, location);
        if !path.exists() {
            return Err(ThumbnailError::FileNotFound(location.reference().to_owned()));
        }
        let mut source = self
            .backend
            .open(path)
            .map_err(|e| source_error(e, location))?;

        trace_stage(Stage::Decoding, location);
        let orientation = source.orientation();
        let frame = source
            .decode_frame_at_zero()
            .map_err(|e| source_error(e, location))?;
        // Release the container and decoder before the image work.
        drop(source);
        let frame = DecodedFrame::new(frame, orientation)?;

        trace_stage(Stage::Resizing, location);
        let frame = frame.fit_width(request.max_width);

        trace_stage(Stage::Encoding, location);
        encode_png(frame)
    }
}

fn trace_stage(stage: Stage, location: &ResolvedLocation) {
    log::trace!("{}: {stage}", location.path().display());
}

fn source_error(error: SourceError, location: &ResolvedLocation) -> ThumbnailError {
    match error {
        SourceError::NotFound(_) => ThumbnailError::FileNotFound(location.reference().to_owned()),
        other => ThumbnailError::Generation(other.to_string()),
    }
}
