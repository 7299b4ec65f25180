//! PNG output.

use std::io::{Cursor, Seek, Write};

use image::{DynamicImage, ImageFormat};

use crate::{DecodedFrame, ThumbnailError};

/// Encode `frame` as a PNG.
///
/// # Errors
/// Returns [`ThumbnailError::Encode`] if the encoder rejects the image.
pub fn encode_png(frame: DecodedFrame) -> Result<Vec<u8>, ThumbnailError> {
    let mut buffer = Vec::new();
    write_png(frame, &mut Cursor::new(&mut buffer))?;
    Ok(buffer)
}

fn write_png<W: Write + Seek>(frame: DecodedFrame, out: &mut W) -> Result<(), ThumbnailError> {
    DynamicImage::ImageRgba8(frame.into_image())
        .write_to(out, ImageFormat::Png)
        .map_err(|e| ThumbnailError::Encode(e.to_string()))
}
