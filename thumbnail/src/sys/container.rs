//! Track transform lookup for MP4/MOV containers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::Orientation;

/// Read the orientation of the first video track in `path`.
///
/// Files that are not MP4/MOV, or have no video track, are reported as
/// [`Orientation::Identity`].
#[must_use]
pub fn track_orientation(path: &Path) -> Orientation {
    match video_track_matrix(path) {
        Ok(Some([a, b, c, d])) => {
            let orientation = Orientation::from_matrix(a, b, c, d);
            log::trace!("{}: track transform {orientation:?}", path.display());
            orientation
        }
        Ok(None) => Orientation::Identity,
        Err(e) if is_iso_media(path) => {
            log::warn!(
                "{}: unreadable track header, assuming no rotation ({e})",
                path.display()
            );
            Orientation::Identity
        }
        Err(e) => {
            log::trace!("{}: no track transform ({e})", path.display());
            Orientation::Identity
        }
    }
}

/// Whether `path` starts like an MP4/MOV file (`ftyp`, `moov`, `mdat`, ...).
fn is_iso_media(path: &Path) -> bool {
    let mut header = [0u8; 8];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .is_ok_and(|()| {
            matches!(
                &header[4..],
                b"ftyp" | b"moov" | b"mdat" | b"free" | b"wide" | b"skip"
            )
        })
}

fn video_track_matrix(path: &Path) -> Result<Option<[i32; 4]>, mp4::Error> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let reader = mp4::Mp4Reader::read_header(BufReader::new(file), size)?;

    let matrix = reader
        .tracks()
        .values()
        .filter(|track| matches!(track.track_type(), Ok(mp4::TrackType::Video)))
        .min_by_key(|track| track.track_id())
        .map(|track| {
            let m = &track.trak.tkhd.matrix;
            [m.a, m.b, m.c, m.d]
        });
    Ok(matrix)
}
