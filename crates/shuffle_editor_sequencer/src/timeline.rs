// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ordered track of segments.
//!
//! Every structural edit (insert, reorder, remove) and every scale change ends
//! with [`Timeline::renormalize`], which rewrites the boundaries of all
//! segments from scratch:
//! - `segment[i].start_time == sum(duration[0..i])`
//! - `segment[i].end_time == start_time + duration`
//! - `segment[i].width == duration * scale`

use crate::error::{Result, SequencerError};
use crate::segment::{Segment, SegmentEdit, SegmentId, SourceDescriptor};
use crate::settings::{palette_color, DEFAULT_PALETTE};
use serde::{Deserialize, Serialize};

/// The edited sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Segments in playback order
    segments: Vec<Segment>,
    /// Pixels per second used for segment widths
    scale: f64,
    /// Colors handed out by insertion order
    palette: Vec<[u8; 3]>,
    /// Cached sum of all durations
    total_duration: f64,
}

impl Timeline {
    /// Create an empty timeline with the default palette
    pub fn new(scale: f64) -> Self {
        Self::with_palette(scale, DEFAULT_PALETTE.to_vec())
    }

    /// Create an empty timeline with a custom palette
    pub fn with_palette(scale: f64, palette: Vec<[u8; 3]>) -> Self {
        Self {
            segments: Vec::new(),
            scale,
            palette,
            total_duration: 0.0,
        }
    }

    /// Place a resolved clip at `at_index` (clamped to the current length).
    ///
    /// The color is picked from the palette by the track length at the moment
    /// of placement.
    pub fn insert(
        &mut self,
        source: SourceDescriptor,
        duration: f64,
        at_index: usize,
    ) -> SegmentId {
        let color = palette_color(&self.palette, self.segments.len());
        let segment = Segment::new(source, duration, color);
        let id = segment.id;
        let index = at_index.min(self.segments.len());
        self.segments.insert(index, segment);
        self.renormalize();
        id
    }

    /// Move the segment at `from` so it ends up at `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.segments.len();
        if from >= len {
            return Err(SequencerError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(SequencerError::IndexOutOfRange { index: to, len });
        }
        if from != to {
            let segment = self.segments.remove(from);
            self.segments.insert(to, segment);
        }
        self.renormalize();
        Ok(())
    }

    /// Remove the segment at `index`
    pub fn remove(&mut self, index: usize) -> Result<Segment> {
        let len = self.segments.len();
        if index >= len {
            return Err(SequencerError::IndexOutOfRange { index, len });
        }
        let segment = self.segments.remove(index);
        self.renormalize();
        Ok(segment)
    }

    /// Apply a metadata edit to a segment
    pub fn edit(&mut self, id: SegmentId, edit: &SegmentEdit) -> Result<&Segment> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SequencerError::SegmentNotFound(id))?;
        edit.apply(segment);
        Ok(segment)
    }

    /// Change the horizontal scale; widths follow
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.renormalize();
    }

    /// Rewrite the boundaries and widths of every segment
    pub fn renormalize(&mut self) {
        let mut cursor = 0.0;
        for segment in &mut self.segments {
            segment.start_time = cursor;
            segment.end_time = cursor + segment.duration;
            segment.width = segment.duration * self.scale;
            cursor = segment.end_time;
        }
        self.total_duration = cursor;
    }

    /// Sum of all segment durations
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Pixels per second
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// All segments in playback order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at an index
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Segment by ID
    pub fn segment_by_id(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Position of a segment in the track
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the track is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(1.0)
    }
}
