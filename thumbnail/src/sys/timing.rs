//! Zero-tolerance placement of decoded frames on the container timeline.

use std::cmp::Ordering;

use super::SourceError;

const MICROS_PER_SECOND: i128 = 1_000_000;

/// Maps stream timestamps onto the container timeline.
///
/// Time zero is the container's start, not the stream's, so a video track
/// whose first sample comes after the timeline origin has no frame at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clock {
    /// Container start, in microseconds.
    origin_us: i64,
    /// Stream time base.
    num: i32,
    den: i32,
}

impl Clock {
    pub(crate) const fn new(origin_us: i64, num: i32, den: i32) -> Self {
        Self {
            origin_us,
            num,
            den,
        }
    }

    /// Compare `pts` with time zero.
    ///
    /// The container start is rounded to the microsecond, so anything closer
    /// than that counts as zero.
    fn compare(&self, pts: i64) -> Ordering {
        let den = i128::from(self.den.max(1));
        let delta = i128::from(pts) * i128::from(self.num) * MICROS_PER_SECOND
            - i128::from(self.origin_us) * den;
        if delta <= -den {
            Ordering::Less
        } else if delta >= den {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    fn seconds_after_zero(&self, pts: i64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let micros = (i128::from(pts) * i128::from(self.num) * MICROS_PER_SECOND
            / i128::from(self.den.max(1))
            - i128::from(self.origin_us)) as f64;
        micros / 1e6
    }
}

/// Where a decoded frame sits relative to time zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Decoder pre-roll before zero; skip it.
    PreRoll,
    /// The frame at time zero.
    AtZero,
}

/// Place a decoded frame on the timeline.
///
/// `first` is whether this is the decoder's first output. Frames without a
/// timestamp are only trusted in that position.
pub(crate) fn place(pts: Option<i64>, clock: &Clock, first: bool) -> Result<Placement, SourceError> {
    match pts.map(|pts| (pts, clock.compare(pts))) {
        Some((_, Ordering::Less)) => Ok(Placement::PreRoll),
        Some((_, Ordering::Equal)) => Ok(Placement::AtZero),
        Some((pts, Ordering::Greater)) => Err(SourceError::Decode(format!(
            "no frame at time zero (first frame at {:.3}s)",
            clock.seconds_after_zero(pts)
        ))),
        None if first => Ok(Placement::AtZero),
        None => Err(SourceError::Decode(
            "no frame at time zero (missing timestamps)".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MP4: Clock = Clock::new(0, 1, 15_360);

    #[test]
    fn frame_at_origin_is_taken() {
        assert_eq!(place(Some(0), &MP4, true), Ok(Placement::AtZero));
    }

    #[test]
    fn pre_roll_is_skipped() {
        assert_eq!(place(Some(-512), &MP4, true), Ok(Placement::PreRoll));
        assert_eq!(place(Some(-1), &MP4, false), Ok(Placement::PreRoll));
    }

    #[test]
    fn late_video_track_has_no_frame_at_zero() {
        // audio starts the timeline, video begins half a second in
        let clock = Clock::new(0, 1, 30_720);
        let err = place(Some(15_360), &clock, true).unwrap_err();
        assert_eq!(
            err,
            SourceError::Decode("no frame at time zero (first frame at 0.500s)".into())
        );
    }

    #[test]
    fn one_tick_late_is_rejected() {
        assert!(place(Some(1), &MP4, true).is_err());
    }

    #[test]
    fn offset_timelines_measure_from_container_start() {
        // MPEG-TS style: timestamps start at 1.4s
        let clock = Clock::new(1_400_000, 1, 90_000);
        assert_eq!(place(Some(126_000), &clock, true), Ok(Placement::AtZero));
        assert_eq!(place(Some(125_000), &clock, true), Ok(Placement::PreRoll));
        assert!(place(Some(126_001), &clock, true).is_err());
    }

    #[test]
    fn rounded_origin_still_matches() {
        // 1/3s stored as 333_333us by the container
        let clock = Clock::new(333_333, 1, 3);
        assert_eq!(place(Some(1), &clock, true), Ok(Placement::AtZero));
    }

    #[test]
    fn missing_timestamp_only_trusted_first() {
        assert_eq!(place(None, &MP4, true), Ok(Placement::AtZero));
        assert_eq!(
            place(None, &MP4, false),
            Err(SourceError::Decode(
                "no frame at time zero (missing timestamps)".into()
            ))
        );
    }
}
