// SPDX-License-Identifier: MIT OR Apache-2.0
//! The sequencer session.
//!
//! [`SequencerSession`] owns every piece of mutable state (track, selection,
//! playhead, player state, ruler) and is the only writer. Hosts forward user
//! input and media callbacks to it and read back [`SequencerEvent`]s.

use crate::backend::{LoadToken, MediaBackend, MediaEvent};
use crate::error::{Result, SequencerError};
use crate::events::{EventBus, SequencerEvent};
use crate::hit_test::{hit_test, Hit};
use crate::library::{SourceId, SourceLibrary};
use crate::markers::{self, RulerMarker};
use crate::playback::{PlaybackController, PlaybackState};
use crate::probe::{DurationProbe, ResolvedInsert};
use crate::segment::{Segment, SegmentEdit, SegmentId, SourceDescriptor};
use crate::settings::SequencerSettings;
use crate::timeline::Timeline;
use std::sync::mpsc;

/// What a drag-and-drop gesture delivers
#[derive(Debug, Clone, PartialEq)]
pub enum DropPayload {
    /// A segment already on the track was moved
    Reorder {
        /// Where it was
        previous_index: usize,
        /// Where it landed
        current_index: usize,
    },
    /// A new source was dropped from the library
    Insert {
        /// Dropped source
        source: SourceDescriptor,
        /// Where it landed
        current_index: usize,
    },
}

/// Sequencer session state
pub struct SequencerSession<B: MediaBackend> {
    settings: SequencerSettings,
    timeline: Timeline,
    playback: PlaybackController,
    player: B,
    probe: DurationProbe<B>,
    library: SourceLibrary,
    selection: Option<SegmentId>,
    markers: Vec<RulerMarker>,
    bus: EventBus,
}

impl<B: MediaBackend> SequencerSession<B> {
    /// Create a session. `player` previews the track, `probe` resolves
    /// durations of dropped clips.
    pub fn new(settings: SequencerSettings, player: B, probe: B) -> Self {
        let timeline = Timeline::with_palette(settings.scale, settings.palette.clone());
        let markers = markers::generate(0.0, settings.scale, settings.marker_pixel_width);
        Self {
            settings,
            timeline,
            playback: PlaybackController::new(),
            player,
            probe: DurationProbe::new(probe),
            library: SourceLibrary::new(),
            selection: None,
            markers,
            bus: EventBus::new(),
        }
    }

    // ---- Structural edits ----

    /// Apply a drop gesture. Inserts return the token of their duration probe.
    pub fn handle_drop(&mut self, payload: DropPayload) -> Result<Option<LoadToken>> {
        match payload {
            DropPayload::Reorder {
                previous_index,
                current_index,
            } => {
                self.reorder(previous_index, current_index)?;
                Ok(None)
            }
            DropPayload::Insert {
                source,
                current_index,
            } => Ok(Some(self.insert(source, current_index))),
        }
    }

    /// Drop a source onto the track. Returns immediately; the segment appears
    /// once its duration has been probed.
    pub fn insert(&mut self, source: SourceDescriptor, at_index: usize) -> LoadToken {
        tracing::debug!("Queueing insert of {} at {}", source.uri, at_index);
        self.probe.request(source, at_index)
    }

    /// Drop a library clip onto the track
    pub fn insert_from_library(&mut self, source: SourceId, at_index: usize) -> Result<LoadToken> {
        let descriptor = self
            .library
            .clip(source)
            .ok_or(SequencerError::SourceNotFound(source))?
            .descriptor();
        Ok(self.insert(descriptor, at_index))
    }

    /// Move a segment
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.timeline.reorder(from, to)?;
        tracing::info!("Moved segment {} to {}", from, to);
        self.after_structural_change();
        Ok(())
    }

    /// Remove a segment, clearing any selection that pointed at it
    pub fn delete(&mut self, index: usize) -> Result<Segment> {
        let removed = self.timeline.remove(index)?;
        tracing::info!("Deleted segment {} ({})", index, removed.name);

        if self.selection == Some(removed.id) {
            self.selection = None;
            self.bus.emit(SequencerEvent::SegmentSelected(None));
        }
        self.bus.emit(SequencerEvent::SegmentDeleted(removed.id));
        self.after_structural_change();
        Ok(removed)
    }

    /// Commit a name/color edit
    pub fn edit_segment(&mut self, id: SegmentId, edit: &SegmentEdit) -> Result<()> {
        self.timeline.edit(id, edit)?;
        self.bus.emit(SequencerEvent::SegmentEdited(id));
        self.bus
            .emit(SequencerEvent::TrackChanged(self.timeline.segments().to_vec()));
        Ok(())
    }

    /// Select a segment, or clear the selection
    pub fn select(&mut self, id: Option<SegmentId>) -> Result<()> {
        if let Some(id) = id {
            if self.timeline.index_of(id).is_none() {
                return Err(SequencerError::SegmentNotFound(id));
            }
        }
        if self.selection != id {
            self.selection = id;
            self.bus.emit(SequencerEvent::SegmentSelected(id));
        }
        Ok(())
    }

    /// Change the horizontal zoom
    pub fn set_scale(&mut self, scale: f64) {
        self.settings.scale = scale;
        self.timeline.set_scale(scale);
        self.rebuild_markers();
        self.bus
            .emit(SequencerEvent::TrackChanged(self.timeline.segments().to_vec()));
    }

    // ---- Playback ----

    /// Start or resume playback
    pub fn play(&mut self) {
        self.playback.play(&self.timeline, &mut self.player);
        self.flush_playback_events();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.playback.pause(&mut self.player);
        self.flush_playback_events();
    }

    /// Stop and rewind
    pub fn stop(&mut self) {
        self.playback.stop(&self.timeline, &mut self.player);
        self.flush_playback_events();
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        self.playback.toggle_playback(&self.timeline, &mut self.player);
        self.flush_playback_events();
    }

    /// Scrub to a global track time
    pub fn seek_global(&mut self, time: f64) {
        self.playback.seek_global(time, &self.timeline, &mut self.player);
        self.flush_playback_events();
    }

    /// Scrub to a time within a segment
    pub fn seek_segment(&mut self, index: usize, local: f64) -> Result<()> {
        let result = self
            .playback
            .seek_segment(index, local, &self.timeline, &mut self.player);
        self.flush_playback_events();
        result
    }

    /// Handle a click on the rendered track. Misses are ignored.
    pub fn click_timeline(&mut self, pointer_x: f64, scroll_offset: f64) -> Option<Hit> {
        let hit = hit_test(
            self.timeline.segments(),
            pointer_x,
            scroll_offset,
            self.timeline.scale(),
        )?;

        self.bus.emit(SequencerEvent::UserPositionChanged {
            track_index: hit.index,
            local: hit.local,
        });
        if let Err(err) = self
            .playback
            .seek_segment(hit.index, hit.local, &self.timeline, &mut self.player)
        {
            tracing::warn!("Click seek failed: {}", err);
        }
        self.flush_playback_events();
        Some(hit)
    }

    /// Route a media callback to whoever issued the load.
    ///
    /// Events from superseded loads are dropped.
    pub fn handle_media_event(&mut self, event: &MediaEvent) {
        if self.probe.owns(event.token) {
            if let Some(resolved) = self.probe.handle(event) {
                self.complete_insert(resolved);
            }
        } else if self.playback.owns(event.token) {
            self.playback
                .handle_media_event(event, &self.timeline, &mut self.player);
            self.flush_playback_events();
        } else {
            tracing::debug!("Dropping media event from a superseded load");
        }
    }

    // ---- Preview list ----

    /// Start previewing a library clip; any other preview stops
    pub fn preview_play(&mut self, source: SourceId) -> Result<()> {
        let previous = self.library.playing();
        self.library.play(source)?;
        if let Some(previous) = previous.filter(|p| *p != source) {
            self.bus.emit(SequencerEvent::PreviewChanged {
                source: previous,
                playing: false,
            });
        }
        self.bus.emit(SequencerEvent::PreviewChanged {
            source,
            playing: true,
        });
        Ok(())
    }

    /// Stop previewing a library clip
    pub fn preview_pause(&mut self, source: SourceId) -> Result<()> {
        self.library.pause(source)?;
        self.bus.emit(SequencerEvent::PreviewChanged {
            source,
            playing: false,
        });
        Ok(())
    }

    // ---- Events ----

    /// Get queued events and clear them
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        self.bus.take_events()
    }

    /// Receive every future event over a channel
    pub fn subscribe(&mut self) -> mpsc::Receiver<SequencerEvent> {
        self.bus.subscribe()
    }

    // ---- Accessors ----

    /// The track
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Segments in playback order
    pub fn segments(&self) -> &[Segment] {
        self.timeline.segments()
    }

    /// Sum of all segment durations
    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration()
    }

    /// Current ruler
    pub fn markers(&self) -> &[RulerMarker] {
        &self.markers
    }

    /// Selected segment
    pub fn selection(&self) -> Option<SegmentId> {
        self.selection
    }

    /// Player state
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Global playhead position
    pub fn global_position(&self) -> f64 {
        self.playback.global_time()
    }

    /// Playhead position within the current segment
    pub fn local_position(&self) -> f64 {
        self.playback.local_time()
    }

    /// Index of the current segment
    pub fn track_index(&self) -> usize {
        self.playback.track_index()
    }

    /// Drops still waiting for their duration
    pub fn pending_inserts(&self) -> usize {
        self.probe.pending()
    }

    /// Source clip list
    pub fn library(&self) -> &SourceLibrary {
        &self.library
    }

    /// Source clip list, mutably
    pub fn library_mut(&mut self) -> &mut SourceLibrary {
        &mut self.library
    }

    /// Active settings
    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    /// Preview backend
    pub fn player(&self) -> &B {
        &self.player
    }

    /// Preview backend, mutably
    pub fn player_mut(&mut self) -> &mut B {
        &mut self.player
    }

    /// Probe backend
    pub fn probe_backend(&self) -> &B {
        self.probe.backend()
    }

    /// Probe backend, mutably
    pub fn probe_backend_mut(&mut self) -> &mut B {
        self.probe.backend_mut()
    }

    /// Release both backends
    pub fn dispose(&mut self) {
        tracing::info!("Disposing sequencer session");
        self.player.dispose();
        self.probe.dispose();
    }

    fn complete_insert(&mut self, resolved: ResolvedInsert) {
        let ResolvedInsert {
            token,
            insert,
            duration,
        } = resolved;
        tracing::debug!("Probe {:?} resolved {} to {:.3}s", token, insert.source.uri, duration);
        let name = insert.source.name.clone();
        let id = self.timeline.insert(insert.source, duration, insert.at_index);
        tracing::info!(
            "Inserted segment {:?} ({}, {:.3}s) at {}",
            id,
            name,
            duration,
            self.timeline.index_of(id).unwrap_or_default()
        );
        self.after_structural_change();
    }

    fn after_structural_change(&mut self) {
        self.bus
            .emit(SequencerEvent::TrackChanged(self.timeline.segments().to_vec()));
        self.rebuild_markers();
        self.playback
            .resync(&self.timeline, &mut self.player, self.settings.overrun_policy);
        self.flush_playback_events();
    }

    fn rebuild_markers(&mut self) {
        self.markers = markers::generate(
            self.timeline.total_duration(),
            self.timeline.scale(),
            self.settings.marker_pixel_width,
        );
        self.bus
            .emit(SequencerEvent::MarkersChanged(self.markers.clone()));
    }

    fn flush_playback_events(&mut self) {
        let events = self.playback.take_events();
        self.bus.extend(events);
    }
}
