//! Decoded frames, orientation and resizing.

use std::fmt;
use std::num::NonZeroU32;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::ThumbnailError;

/// Rotation/mirroring stored in a video track's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Pixels are already upright.
    #[default]
    Identity,
    /// Rotate 90° clockwise.
    Rotate90,
    /// Rotate 180°.
    Rotate180,
    /// Rotate 270° clockwise.
    Rotate270,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Mirror across the top-left to bottom-right diagonal.
    Transpose,
    /// Mirror across the top-right to bottom-left diagonal.
    Transverse,
}

impl Orientation {
    /// Derive the orientation from the 2x2 part of a track transform matrix.
    ///
    /// Uses the `QuickTime` layout `[a b; c d]`, where a portrait phone
    /// recording is `[0 1; -1 0]`. Only the signs matter, so both 16.16 fixed
    /// point and plain values are accepted. Anything that is not a multiple of
    /// 90° is treated as [`Orientation::Identity`].
    #[must_use]
    pub const fn from_matrix(a: i32, b: i32, c: i32, d: i32) -> Self {
        match (a.signum(), b.signum(), c.signum(), d.signum()) {
            (0, 1, -1, 0) => Self::Rotate90,
            (-1, 0, 0, -1) => Self::Rotate180,
            (0, -1, 1, 0) => Self::Rotate270,
            (-1, 0, 0, 1) => Self::FlipHorizontal,
            (1, 0, 0, -1) => Self::FlipVertical,
            (0, 1, 1, 0) => Self::Transpose,
            (0, -1, -1, 0) => Self::Transverse,
            _ => Self::Identity,
        }
    }

    /// Whether applying this orientation swaps width and height.
    #[must_use]
    pub const fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Rotate90 | Self::Rotate270 | Self::Transpose | Self::Transverse
        )
    }

    /// Apply the transform to `image`.
    #[must_use]
    pub fn apply(self, image: RgbaImage) -> RgbaImage {
        match self {
            Self::Identity => image,
            Self::Rotate90 => imageops::rotate90(&image),
            Self::Rotate180 => imageops::rotate180(&image),
            Self::Rotate270 => imageops::rotate270(&image),
            Self::FlipHorizontal => imageops::flip_horizontal(&image),
            Self::FlipVertical => imageops::flip_vertical(&image),
            Self::Transpose => imageops::flip_horizontal(&imageops::rotate90(&image)),
            Self::Transverse => imageops::flip_horizontal(&imageops::rotate270(&image)),
        }
    }
}

/// A raw frame as produced by a decode backend.
///
/// Pixels are tightly packed RGBA8 in the stored (not yet oriented) layout.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw pixel data, `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// An upright RGBA frame, ready to resize and encode.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    image: RgbaImage,
}

impl DecodedFrame {
    /// Validate `frame` and apply `orientation` to it.
    ///
    /// # Errors
    /// Returns [`ThumbnailError::Generation`] if the frame is empty or its
    /// buffer does not match its dimensions.
    pub fn new(frame: Frame, orientation: Orientation) -> Result<Self, ThumbnailError> {
        let Frame {
            data,
            width,
            height,
        } = frame;
        if width == 0 || height == 0 {
            return Err(ThumbnailError::Generation(format!(
                "decoded frame has no pixels ({width}x{height})"
            )));
        }
        let len = data.len();
        let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            ThumbnailError::Generation(format!(
                "decoded frame buffer of {len} bytes does not fit {width}x{height} RGBA"
            ))
        })?;
        Ok(Self {
            image: orientation.apply(image),
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Downscale so the width is at most `max_width`, keeping the aspect ratio.
    ///
    /// Frames that already fit are returned untouched.
    #[must_use]
    pub fn fit_width(self, max_width: NonZeroU32) -> Self {
        let (width, height) = (self.width(), self.height());
        let (new_width, new_height) = scaled_size(width, height, max_width);
        if (new_width, new_height) == (width, height) {
            return self;
        }
        log::trace!("resizing {width}x{height} -> {new_width}x{new_height}");
        Self {
            image: imageops::resize(&self.image, new_width, new_height, FilterType::Triangle),
        }
    }

    /// Borrow the pixels.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

/// Target size for a `width` x `height` frame bounded by `max_width`.
///
/// The scale factor is `max_width / width`, applied to both axes. The height is
/// rounded to the nearest pixel and never drops below one.
#[must_use]
pub fn scaled_size(width: u32, height: u32, max_width: NonZeroU32) -> (u32, u32) {
    let max_width = max_width.get();
    if width <= max_width {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    // scaled <= height because max_width < width
    let new_height = u32::try_from(scaled).unwrap_or(height).max(1);
    (max_width, new_height)
}
