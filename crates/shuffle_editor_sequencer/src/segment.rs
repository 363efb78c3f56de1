// SPDX-License-Identifier: MIT OR Apache-2.0
//! Segments placed on the track.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    /// Create a new random segment ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a drop hands over when a new clip lands on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Display name
    pub name: String,
    /// Media locator
    pub uri: String,
}

impl SourceDescriptor {
    /// Create a new source descriptor
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }
}

/// One clip placed on the track.
///
/// `start_time`, `end_time` and `width` are owned by the timeline and are
/// rewritten on every renormalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique segment ID
    pub id: SegmentId,
    /// Display name
    pub name: String,
    /// Media locator
    pub source_uri: String,
    /// Clip duration in seconds
    pub duration: f64,
    /// Offset of the clip on the track
    pub start_time: f64,
    /// `start_time + duration`
    pub end_time: f64,
    /// Display color
    pub color: [u8; 3],
    /// Cached width in pixels (`duration * scale`)
    pub width: f64,
}

impl Segment {
    /// Create a detached segment; boundaries are zero until placed on a timeline
    pub fn new(source: SourceDescriptor, duration: f64, color: [u8; 3]) -> Self {
        Self {
            id: SegmentId::new(),
            name: source.name,
            source_uri: source.uri,
            duration: sanitize_duration(duration),
            start_time: 0.0,
            end_time: 0.0,
            color,
            width: 0.0,
        }
    }
}

/// Metadata edit committed by the settings form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentEdit {
    /// New name
    pub name: Option<String>,
    /// New color
    pub color: Option<[u8; 3]>,
}

impl SegmentEdit {
    /// Edit only the name
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            color: None,
        }
    }

    /// Edit only the color
    pub fn color(color: [u8; 3]) -> Self {
        Self {
            name: None,
            color: Some(color),
        }
    }

    /// Apply the edit in place
    pub fn apply(&self, segment: &mut Segment) {
        if let Some(name) = &self.name {
            segment.name.clone_from(name);
        }
        if let Some(color) = self.color {
            segment.color = color;
        }
    }
}

/// Backends report missing metadata as NaN or negative values
fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_segment_is_detached() {
        let segment = Segment::new(SourceDescriptor::new("clip", "a.mp4"), 4.0, [255, 0, 0]);
        assert_eq!(segment.duration, 4.0);
        assert_eq!(segment.start_time, 0.0);
        assert_eq!(segment.end_time, 0.0);
        assert_eq!(segment.source_uri, "a.mp4");
    }

    #[test]
    fn test_unresolved_duration_is_zero() {
        let nan = Segment::new(SourceDescriptor::new("a", "a.mp4"), f64::NAN, [0, 0, 0]);
        let negative = Segment::new(SourceDescriptor::new("b", "b.mp4"), -3.0, [0, 0, 0]);
        assert_eq!(nan.duration, 0.0);
        assert_eq!(negative.duration, 0.0);
    }

    #[test]
    fn test_same_source_gives_distinct_identity() {
        let source = SourceDescriptor::new("clip", "a.mp4");
        let a = Segment::new(source.clone(), 1.0, [0, 0, 0]);
        let b = Segment::new(source, 1.0, [0, 0, 0]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_edit_applies_only_set_fields() {
        let mut segment = Segment::new(SourceDescriptor::new("clip", "a.mp4"), 1.0, [1, 2, 3]);
        SegmentEdit::name("renamed").apply(&mut segment);
        assert_eq!(segment.name, "renamed");
        assert_eq!(segment.color, [1, 2, 3]);

        SegmentEdit::color([9, 9, 9]).apply(&mut segment);
        assert_eq!(segment.name, "renamed");
        assert_eq!(segment.color, [9, 9, 9]);
    }
}
