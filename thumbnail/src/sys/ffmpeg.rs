//! Software decoding through `FFmpeg`.

use std::path::Path;
use std::sync::OnceLock;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{Pixel, context::Input};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video;

use super::timing::{Clock, Placement, place};
use super::{Backend, FrameSource, SourceError, track_orientation};
use crate::{Frame, Orientation};

/// `AV_NOPTS_VALUE`
const NO_PTS: i64 = i64::MIN;

fn init() -> Result<(), SourceError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    INIT.get_or_init(|| {
        ffmpeg::init().map_err(|e| e.to_string())?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        Ok(())
    })
    .clone()
    .map_err(SourceError::Open)
}

/// Decodes with the `FFmpeg` libraries linked into the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl Backend for FfmpegBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        Ok(Box::new(FfmpegSource::open(path)?))
    }
}

/// One opened container and a decoder for its best video stream.
pub struct FfmpegSource {
    input: Input,
    decoder: ffmpeg::decoder::Video,
    stream_index: usize,
    clock: Clock,
    orientation: Orientation,
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("stream_index", &self.stream_index)
            .field("clock", &self.clock)
            .field("orientation", &self.orientation)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Open `path` and prepare a decoder for its best video stream.
    ///
    /// # Errors
    /// Returns [`SourceError::Open`] if the container cannot be read and
    /// [`SourceError::Decode`] if it has no decodable video stream.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        init()?;

        let input = ffmpeg::format::input(path).map_err(|e| SourceError::Open(e.to_string()))?;

        // Time zero is the start of the container timeline, not of the stream.
        // SAFETY: `input` owns a valid format context for as long as it lives.
        let origin_us = match unsafe { (*input.as_ptr()).start_time } {
            NO_PTS => 0,
            ts => ts,
        };

        let (stream_index, clock, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| SourceError::Decode("no video track".into()))?;
            let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| SourceError::Decode(format!("codec parameters: {e}")))?;
            let decoder = context
                .decoder()
                .video()
                .map_err(|e| SourceError::Decode(format!("unsupported codec: {e}")))?;
            let time_base = stream.time_base();
            let clock = Clock::new(origin_us, time_base.numerator(), time_base.denominator());
            (stream.index(), clock, decoder)
        };

        Ok(Self {
            input,
            decoder,
            stream_index,
            clock,
            orientation: track_orientation(path),
        })
    }
}

impl FrameSource for FfmpegSource {
    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn decode_frame_at_zero(&mut self) -> Result<Frame, SourceError> {
        let clock = self.clock;
        let mut decoded = Video::empty();
        let mut first = true;

        for item in self.input.packets() {
            let (stream, packet) = item.map_err(|e| SourceError::Decode(e.to_string()))?;
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder
                .send_packet(&packet)
                .map_err(|e| SourceError::Decode(e.to_string()))?;
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                if let Some(frame) = accept(&decoded, &clock, first)? {
                    return Ok(frame);
                }
                first = false;
            }
        }

        // Flush frames held back for reordering.
        self.decoder
            .send_eof()
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            if let Some(frame) = accept(&decoded, &clock, first)? {
                return Ok(frame);
            }
            first = false;
        }

        Err(SourceError::Decode("no frame decoded".into()))
    }
}

/// Convert `decoded` if it is the frame at time zero.
///
/// `Ok(None)` means the frame is pre-roll and should be skipped.
fn accept(decoded: &Video, clock: &Clock, first: bool) -> Result<Option<Frame>, SourceError> {
    match place(decoded.pts(), clock, first)? {
        Placement::PreRoll => Ok(None),
        Placement::AtZero => to_rgba(decoded).map(Some),
    }
}

fn to_rgba(decoded: &Video) -> Result<Frame, SourceError> {
    let (width, height) = (decoded.width(), decoded.height());
    let mut scaler = SwsContext::get(
        decoded.format(),
        width,
        height,
        Pixel::RGBA,
        width,
        height,
        Flags::BILINEAR,
    )
    .map_err(|e| SourceError::Decode(format!("pixel format conversion: {e}")))?;

    let mut rgba = Video::empty();
    scaler
        .run(decoded, &mut rgba)
        .map_err(|e| SourceError::Decode(format!("pixel format conversion: {e}")))?;

    // Copy only visible pixels, not stride padding.
    let stride = rgba.stride(0);
    let row_bytes = width as usize * 4;
    let raw = rgba.data(0);
    let data = (0..height as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect();

    Ok(Frame {
        data,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_not_openable_or_decodable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"\x00\x01\x02 this is not a video").unwrap();

        let result = FfmpegBackend.open(file.path()).and_then(|mut source| {
            source.decode_frame_at_zero()
        });
        assert!(matches!(
            result,
            Err(SourceError::Open(_) | SourceError::Decode(_))
        ));
    }

    #[test]
    fn empty_file_fails_to_open() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(FfmpegBackend.open(file.path()).is_err());
    }
}
