//! Segment ↔ angle mapping
//!
//! Segments are 1-indexed stop positions. A segment's angle centres its
//! symbol under the stop marker rather than aligning the symbol's edge.

use std::f64::consts::TAU;

use crate::error::ReelError;
use crate::wrap_angle;

/// Angular size of one segment
#[inline]
pub fn segment_step(segments_per_reel: u32) -> f64 {
    TAU / segments_per_reel as f64
}

/// Rotation in [0, 2π) that lands `segment` under the stop marker
pub fn angle_for(segment: u32, segments_per_reel: u32) -> Result<f64, ReelError> {
    if segment == 0 || segment > segments_per_reel {
        return Err(ReelError::InvalidSegment {
            reel: 0,
            segment,
            segments_per_reel,
        });
    }

    let step = segment_step(segments_per_reel);
    let offset = step / 2.0;
    Ok(wrap_angle(TAU - ((segment - 1) as f64 * step + offset)))
}

/// Segment shown under the stop marker at an arbitrary (unbounded) angle
pub fn segment_at(angle: f64, segments_per_reel: u32) -> u32 {
    let step = segment_step(segments_per_reel);
    // Distance travelled back from the top of the strip, in segments
    let from_top = wrap_angle(-angle) / step;
    let index = from_top.floor() as u32;
    index.min(segments_per_reel - 1) + 1
}

/// Validate every stop and map it to its angle, tagging errors with the reel index
pub fn angles_for(segments: &[u32], segments_per_reel: u32) -> Result<Vec<f64>, ReelError> {
    segments
        .iter()
        .enumerate()
        .map(|(reel, &segment)| {
            angle_for(segment, segments_per_reel).map_err(|_| ReelError::InvalidSegment {
                reel,
                segment,
                segments_per_reel,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_five_segment_angles() {
        let expected = [(2, 4.398), (4, 1.885), (1, 5.655)];
        for (segment, angle) in expected {
            let got = angle_for(segment, 5).unwrap();
            assert!((got - angle).abs() < 1e-3, "segment {segment}: {got}");
        }
    }

    #[test]
    fn test_single_segment_reel() {
        let angle = angle_for(1, 1).unwrap();
        assert!((angle - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(segment_at(angle, 1), 1);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            angle_for(0, 5),
            Err(ReelError::InvalidSegment { segment: 0, .. })
        ));
        assert!(angle_for(6, 5).is_err());
    }

    #[test]
    fn test_angles_for_reports_reel() {
        let err = angles_for(&[1, 2, 9], 5).unwrap_err();
        assert!(matches!(err, ReelError::InvalidSegment { reel: 2, segment: 9, .. }));
    }

    #[test]
    fn test_segment_at_extra_turns() {
        let angle = angle_for(3, 8).unwrap() + 7.0 * TAU;
        assert_eq!(segment_at(angle, 8), 3);
    }

    proptest! {
        #[test]
        fn angle_in_range_and_round_trips(s in 1u32..200, pick in 0u32..200) {
            let segment = pick % s + 1;
            let angle = angle_for(segment, s).unwrap();
            prop_assert!((0.0..TAU).contains(&angle));
            prop_assert_eq!(segment_at(angle, s), segment);
        }

        #[test]
        fn angle_is_injective(s in 2u32..120, a in 0u32..120, b in 0u32..120) {
            let (a, b) = (a % s + 1, b % s + 1);
            prop_assume!(a != b);
            let diff = (angle_for(a, s).unwrap() - angle_for(b, s).unwrap()).abs();
            prop_assert!(diff > segment_step(s) / 2.0);
        }
    }
}
