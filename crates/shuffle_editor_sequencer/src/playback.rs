// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback of the concatenated track through a single media backend.
//!
//! The controller keeps the `(track index, local time)` pair and the global
//! position in lockstep. Each source load gets a fresh [`LoadToken`]; events
//! carrying any other token are stale and dropped. A seek issued while a load
//! is pending is applied when that load's metadata arrives, so the newest
//! requested position always wins.

use crate::backend::{LoadToken, MediaBackend, MediaEvent, MediaEventKind};
use crate::error::{Result, SequencerError};
use crate::events::SequencerEvent;
use crate::segment::SegmentId;
use crate::settings::OverrunPolicy;
use crate::sync;
use crate::timeline::Timeline;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Playback controller for the track
#[derive(Debug, Default)]
pub struct PlaybackController {
    /// Playback state
    state: PlaybackState,
    /// Index of the segment the position refers to
    track_index: usize,
    /// Time within that segment
    local_time: f64,
    /// Time across the whole track
    global_time: f64,
    /// Segment the position refers to
    segment: Option<SegmentId>,
    /// Load whose events are accepted
    current_load: Option<LoadToken>,
    /// Segment whose source was last loaded
    loaded_segment: Option<SegmentId>,
    /// Whether metadata for the current load has arrived
    ready: bool,
    /// Events emitted since the last drain
    pending_events: Vec<SequencerEvent>,
}

impl PlaybackController {
    /// Create a new playback controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or resume playback of the current segment
    pub fn play(&mut self, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        if timeline.is_empty() {
            tracing::warn!("Ignoring play request on an empty track");
            return;
        }

        // Playing from the very end starts over
        if self.global_time >= timeline.total_duration() || self.segment.is_none() {
            let start = if self.global_time >= timeline.total_duration() {
                0.0
            } else {
                self.global_time
            };
            self.seek_global(start, timeline, backend);
        }

        self.set_state(PlaybackState::Playing);
        match self.segment {
            Some(id) if self.loaded_segment == Some(id) && self.current_load.is_some() => {
                if self.ready {
                    backend.seek(self.local_time);
                    backend.play();
                }
                // Otherwise the pending load starts playback
            }
            _ => self.load_current(timeline, backend),
        }
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self, backend: &mut dyn MediaBackend) {
        if self.state == PlaybackState::Playing {
            backend.pause();
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Stop and rewind to the start of the track
    pub fn stop(&mut self, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        backend.pause();
        self.set_state(PlaybackState::Stopped);
        self.seek_global(0.0, timeline, backend);
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        match self.state {
            PlaybackState::Playing => self.pause(backend),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(timeline, backend),
        }
    }

    /// Seek to a global track time; valid in any state
    pub fn seek_global(&mut self, time: f64, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        match sync::resolve(timeline.segments(), time) {
            Some((index, local)) => self.move_to(index, local, timeline, backend),
            None => self.reset_position(),
        }
    }

    /// Seek to a time within a specific segment
    pub fn seek_segment(
        &mut self,
        index: usize,
        local: f64,
        timeline: &Timeline,
        backend: &mut dyn MediaBackend,
    ) -> Result<()> {
        let segment = timeline.segment(index).ok_or(SequencerError::IndexOutOfRange {
            index,
            len: timeline.len(),
        })?;
        let local = local.clamp(0.0, segment.duration);
        self.move_to(index, local, timeline, backend);
        Ok(())
    }

    /// Re-anchor the position after a structural edit.
    ///
    /// If the track is now shorter than the global position, `policy` picks
    /// the corrected position. Otherwise the current segment is followed to
    /// its new index, or the segment now under the position is loaded if the
    /// current one was removed.
    pub fn resync(
        &mut self,
        timeline: &Timeline,
        backend: &mut dyn MediaBackend,
        policy: OverrunPolicy,
    ) {
        if timeline.is_empty() {
            if self.current_load.take().is_some() {
                backend.pause();
            }
            self.loaded_segment = None;
            self.ready = false;
            self.reset_position();
            self.set_state(PlaybackState::Stopped);
            return;
        }

        let total = timeline.total_duration();
        if self.global_time > total {
            let corrected = policy.apply(self.global_time, total);
            tracing::debug!(
                "Position {:.3}s is past the new end {:.3}s, moved to {:.3}s",
                self.global_time,
                total,
                corrected
            );
            self.seek_global(corrected, timeline, backend);
            return;
        }

        let followed = self.segment.and_then(|id| timeline.index_of(id));
        match followed {
            Some(index) => {
                let Some(segment) = timeline.segment(index) else {
                    return;
                };
                let local = self.local_time.clamp(0.0, segment.duration);
                self.set_position(index, local, segment.start_time + local);
            }
            None => self.seek_global(self.global_time, timeline, backend),
        }
    }

    /// Feed a media event. Returns `false` if the event was stale.
    pub fn handle_media_event(
        &mut self,
        event: &MediaEvent,
        timeline: &Timeline,
        backend: &mut dyn MediaBackend,
    ) -> bool {
        if self.current_load != Some(event.token) {
            tracing::debug!("Discarding stale media event {:?}", event.kind);
            return false;
        }

        match event.kind {
            MediaEventKind::LoadedMetadata { .. } => {
                self.ready = true;
                backend.seek(self.local_time);
                if self.state == PlaybackState::Playing {
                    backend.play();
                }
            }
            MediaEventKind::TimeUpdate { current_time } => {
                let Ok(global) =
                    sync::to_global(timeline.segments(), self.track_index, current_time)
                else {
                    tracing::warn!("Track index {} is out of range", self.track_index);
                    return true;
                };
                self.local_time = current_time;
                self.global_time = global;
                self.pending_events
                    .push(SequencerEvent::GlobalPositionChanged(global));
            }
            MediaEventKind::Ended => self.on_segment_ended(timeline, backend),
        }
        true
    }

    /// Whether `token` is the load the controller is waiting on
    pub fn owns(&self, token: LoadToken) -> bool {
        self.current_load == Some(token)
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index of the current segment
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    /// Time within the current segment
    pub fn local_time(&self) -> f64 {
        self.local_time
    }

    /// Time across the whole track
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// The segment the position refers to
    pub fn current_segment(&self) -> Option<SegmentId> {
        self.segment
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn on_segment_ended(&mut self, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let next = self.track_index + 1;
        if let Some(segment) = timeline.segment(next) {
            tracing::debug!("Advancing to segment {}", next);
            self.set_position(next, 0.0, segment.start_time);
            self.segment = Some(segment.id);
            self.load_current(timeline, backend);
            return;
        }

        let Some(last) = timeline.segment(self.track_index) else {
            self.reset_position();
            self.set_state(PlaybackState::Paused);
            return;
        };
        self.set_position(self.track_index, last.duration, last.end_time);
        self.set_state(PlaybackState::Paused);
    }

    fn move_to(
        &mut self,
        index: usize,
        local: f64,
        timeline: &Timeline,
        backend: &mut dyn MediaBackend,
    ) {
        let Some(segment) = timeline.segment(index) else {
            return;
        };
        let id = segment.id;
        self.set_position(index, local, segment.start_time + local);
        self.segment = Some(id);

        if self.loaded_segment == Some(id) && self.current_load.is_some() {
            if self.ready {
                backend.seek(local);
            }
        } else {
            self.load_current(timeline, backend);
        }
    }

    fn load_current(&mut self, timeline: &Timeline, backend: &mut dyn MediaBackend) {
        let Some(segment) = timeline.segment(self.track_index) else {
            return;
        };
        let token = LoadToken::new();
        self.current_load = Some(token);
        self.loaded_segment = Some(segment.id);
        self.ready = false;
        tracing::debug!("Loading segment {} ({})", self.track_index, segment.source_uri);
        backend.load(token, &segment.source_uri);
    }

    fn set_position(&mut self, index: usize, local: f64, global: f64) {
        if index != self.track_index {
            self.track_index = index;
            self.pending_events
                .push(SequencerEvent::TrackIndexChanged(index));
        }
        self.local_time = local;
        if global != self.global_time {
            self.global_time = global;
            self.pending_events
                .push(SequencerEvent::GlobalPositionChanged(global));
        }
    }

    fn reset_position(&mut self) {
        self.set_position(0, 0.0, 0.0);
        self.segment = None;
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(SequencerEvent::PlaybackStateChanged(state));
        }
    }
}
