// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversions between global track time and `(track index, local time)`.
//!
//! `to_global` and `to_local` only shift by the durations before the index;
//! they do not check that the result lands inside that segment. Callers that
//! start from a global time use [`resolve`] so the index and the local time
//! are always derived together.

use crate::error::{Result, SequencerError};
use crate::segment::Segment;

/// Where a global time falls on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    /// Inside the segment at `index`
    Within {
        /// Track index
        index: usize,
        /// Time relative to the segment start
        local: f64,
    },
    /// Past the last segment
    BeyondEnd,
    /// The track has no segments
    Empty,
}

/// Sum of the durations of `segments[0..index]`
fn offset_of(segments: &[Segment], index: usize) -> Result<f64> {
    if index > segments.len() {
        return Err(SequencerError::IndexOutOfRange {
            index,
            len: segments.len(),
        });
    }
    Ok(segments[..index].iter().map(|s| s.duration).sum())
}

/// Convert a local time within segment `index` to global track time
pub fn to_global(segments: &[Segment], index: usize, local: f64) -> Result<f64> {
    if segments.is_empty() {
        return Ok(local);
    }
    Ok(offset_of(segments, index)? + local)
}

/// Convert a global track time to a time local to segment `index`.
///
/// The result can be negative or exceed the segment's duration when `index`
/// is stale relative to `global`.
pub fn to_local(segments: &[Segment], index: usize, global: f64) -> Result<f64> {
    if segments.is_empty() {
        return Ok(global);
    }
    Ok(global - offset_of(segments, index)?)
}

/// Find the segment containing a global time.
///
/// The end of the track belongs to the last segment; anything past it is
/// [`Location::BeyondEnd`]. Negative times are treated as the start.
pub fn locate(segments: &[Segment], global: f64) -> Location {
    if segments.is_empty() {
        return Location::Empty;
    }

    let global = global.max(0.0);
    let mut cumulative = 0.0;
    for (index, segment) in segments.iter().enumerate() {
        let end = cumulative + segment.duration;
        if global < end {
            return Location::Within {
                index,
                local: global - cumulative,
            };
        }
        cumulative = end;
    }

    if global == cumulative {
        let index = segments.len() - 1;
        return Location::Within {
            index,
            local: segments[index].duration,
        };
    }

    Location::BeyondEnd
}

/// Resolve a global time to `(index, local)`, clamping past-the-end times to
/// the end of the last segment. Returns `None` for an empty track.
pub fn resolve(segments: &[Segment], global: f64) -> Option<(usize, f64)> {
    match locate(segments, global) {
        Location::Within { index, local } => Some((index, local)),
        Location::BeyondEnd => segments
            .last()
            .map(|last| (segments.len() - 1, last.duration)),
        Location::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SourceDescriptor;
    use crate::timeline::Timeline;

    const EPSILON: f64 = 1e-9;

    fn track(durations: &[f64]) -> Timeline {
        let mut timeline = Timeline::new(1.0);
        for (i, duration) in durations.iter().enumerate() {
            timeline.insert(SourceDescriptor::new("clip", format!("{i}.mp4")), *duration, i);
        }
        timeline
    }

    #[test]
    fn test_to_global_sums_predecessors() {
        let timeline = track(&[5.0, 7.0, 3.0]);
        let segments = timeline.segments();
        assert_eq!(to_global(segments, 0, 4.9).unwrap(), 4.9);
        assert_eq!(to_global(segments, 1, 2.0).unwrap(), 7.0);
        assert_eq!(to_global(segments, 3, 0.0).unwrap(), 15.0);
    }

    #[test]
    fn test_empty_track_passes_time_through() {
        assert_eq!(to_global(&[], 0, 3.5).unwrap(), 3.5);
        assert_eq!(to_global(&[], 4, 3.5).unwrap(), 3.5);
        assert_eq!(to_local(&[], 0, 3.5).unwrap(), 3.5);
    }

    #[test]
    fn test_index_past_length_is_rejected() {
        let timeline = track(&[5.0]);
        assert_eq!(
            to_global(timeline.segments(), 2, 0.0),
            Err(SequencerError::IndexOutOfRange { index: 2, len: 1 })
        );
        assert!(to_local(timeline.segments(), 2, 0.0).is_err());
    }

    #[test]
    fn test_stale_index_gives_out_of_segment_local() {
        let timeline = track(&[5.0, 7.0]);
        assert_eq!(to_local(timeline.segments(), 1, 2.0).unwrap(), -3.0);
        assert_eq!(to_local(timeline.segments(), 0, 9.0).unwrap(), 9.0);
    }

    #[test]
    fn test_round_trip() {
        let timeline = track(&[5.0, 7.0, 3.25]);
        let segments = timeline.segments();
        for index in 0..=segments.len() {
            for time in [0.0, 1.5, 4.75, 11.0] {
                let local = to_local(segments, index, time).unwrap();
                assert!((to_global(segments, index, local).unwrap() - time).abs() < EPSILON);

                let global = to_global(segments, index, time).unwrap();
                assert!((to_local(segments, index, global).unwrap() - time).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_locate_scans_boundaries() {
        let timeline = track(&[5.0, 7.0]);
        let segments = timeline.segments();
        assert_eq!(locate(segments, 0.0), Location::Within { index: 0, local: 0.0 });
        assert_eq!(locate(segments, 4.9), Location::Within { index: 0, local: 4.9 });
        assert_eq!(locate(segments, 5.0), Location::Within { index: 1, local: 0.0 });
        assert_eq!(locate(segments, 12.0), Location::Within { index: 1, local: 7.0 });
        assert_eq!(locate(segments, 12.5), Location::BeyondEnd);
        assert_eq!(locate(segments, -1.0), Location::Within { index: 0, local: 0.0 });
        assert_eq!(locate(&[], 1.0), Location::Empty);
    }

    #[test]
    fn test_locate_skips_zero_length_segments() {
        let timeline = track(&[0.0, 4.0]);
        assert_eq!(
            locate(timeline.segments(), 0.0),
            Location::Within { index: 1, local: 0.0 }
        );
    }

    #[test]
    fn test_resolve_clamps_to_end() {
        let timeline = track(&[5.0, 7.0]);
        assert_eq!(resolve(timeline.segments(), 100.0), Some((1, 7.0)));
        assert_eq!(resolve(timeline.segments(), 6.0), Some((1, 1.0)));
        assert_eq!(resolve(&[], 6.0), None);
    }
}
