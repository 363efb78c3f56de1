// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequential clip timeline for Shuffle Editor.
//!
//! This crate provides the model behind a single-track video sequencer:
//! - Ordered segments with derived start/end boundaries
//! - Conversion between global track time and per-segment time
//! - Time ruler markers and pointer hit-testing
//! - Playback across segment boundaries through a media backend
//!
//! ## Architecture
//!
//! [`SequencerSession`] owns all mutable state. Media backends report
//! [`MediaEvent`]s tagged with the [`LoadToken`] of the load that produced
//! them, so callbacks from superseded loads are discarded. Observers read
//! [`SequencerEvent`]s from the session's event bus.

pub mod backend;
pub mod error;
pub mod events;
pub mod library;
pub mod markers;
pub mod playback;
pub mod probe;
pub mod segment;
pub mod session;
pub mod settings;
pub mod sync;
pub mod timeline;

pub use backend::{
    BackendCall, LoadToken, MediaBackend, MediaEvent, MediaEventKind, SimulatedBackend,
};
pub use error::{Result, SequencerError};
pub use events::{EventBus, SequencerEvent};
pub use hit_test::{hit_test, Hit};
pub use library::{SourceClip, SourceId, SourceLibrary};
pub use markers::RulerMarker;
pub use playback::{PlaybackController, PlaybackState};
pub use probe::{DurationProbe, PendingInsert, ResolvedInsert};
pub use segment::{Segment, SegmentEdit, SegmentId, SourceDescriptor};
pub use session::{DropPayload, SequencerSession};
pub use settings::{
    palette_color, OverrunPolicy, SequencerSettings, DEFAULT_MARKER_PIXEL_WIDTH, DEFAULT_PALETTE,
    SETTINGS_FILE_NAME,
};
pub use sync::Location;
pub use timeline::Timeline;
