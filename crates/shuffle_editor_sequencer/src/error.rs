// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer errors.

use crate::library::SourceId;
use crate::segment::SegmentId;
use thiserror::Error;

/// Errors raised by timeline operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequencerError {
    /// A track index was outside the valid range
    #[error("Track index {index} out of range (track has {len} segments)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Track length at the time of the request
        len: usize,
    },

    /// No segment with this ID is on the track
    #[error("Segment not found: {0:?}")]
    SegmentNotFound(SegmentId),

    /// No source with this ID is in the library
    #[error("Source not found: {0:?}")]
    SourceNotFound(SourceId),
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
