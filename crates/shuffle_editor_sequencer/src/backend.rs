// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media player interface.
//!
//! The sequencer never decodes media itself. It drives a [`MediaBackend`]
//! and reacts to the [`MediaEvent`]s the host feeds back. Every load is tagged
//! with a [`LoadToken`]; the host attaches the token of the load an event
//! belongs to, which lets the sequencer drop callbacks from superseded loads.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Identifies one `load` issued to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadToken(pub Uuid);

impl LoadToken {
    /// Create a new random load token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoadToken {
    fn default() -> Self {
        Self::new()
    }
}

/// What the media player reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaEventKind {
    /// Metadata of the loaded source is available
    LoadedMetadata {
        /// Source duration in seconds (may be NaN when unknown)
        duration: f64,
    },
    /// Playback time advanced
    TimeUpdate {
        /// Current time within the loaded source
        current_time: f64,
    },
    /// Playback reached the end of the source
    Ended,
}

/// A media player callback tagged with the load it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaEvent {
    /// Load that produced the event
    pub token: LoadToken,
    /// Event payload
    pub kind: MediaEventKind,
}

impl MediaEvent {
    /// Metadata event
    pub fn loaded_metadata(token: LoadToken, duration: f64) -> Self {
        Self {
            token,
            kind: MediaEventKind::LoadedMetadata { duration },
        }
    }

    /// Time update event
    pub fn time_update(token: LoadToken, current_time: f64) -> Self {
        Self {
            token,
            kind: MediaEventKind::TimeUpdate { current_time },
        }
    }

    /// End-of-source event
    pub fn ended(token: LoadToken) -> Self {
        Self {
            token,
            kind: MediaEventKind::Ended,
        }
    }
}

/// Media player driven by the sequencer
pub trait MediaBackend {
    /// Start loading a source; events for it must carry `token`
    fn load(&mut self, token: LoadToken, uri: &str);
    /// Start or resume playback
    fn play(&mut self);
    /// Pause playback
    fn pause(&mut self);
    /// Move the playhead within the loaded source
    fn seek(&mut self, time: f64);
    /// Playhead within the loaded source
    fn current_time(&self) -> f64;
    /// Duration of the loaded source, if known
    fn duration(&self) -> Option<f64>;
    /// Release the player
    fn dispose(&mut self);
}

/// Calls recorded by [`SimulatedBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `load(uri)`
    Load(String),
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `seek(time)`
    Seek(f64),
    /// `dispose()`
    Dispose,
}

#[derive(Debug, Clone)]
struct LoadedSource {
    token: LoadToken,
    duration: Option<f64>,
}

/// Headless media player with a fixed table of source durations.
///
/// Metadata is queued as soon as a source is loaded; playback advances only
/// through [`SimulatedBackend::tick`] or the `report_*` helpers. Queued events
/// are handed to the host by [`SimulatedBackend::take_events`].
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    durations: HashMap<String, f64>,
    loaded: Option<LoadedSource>,
    current_time: f64,
    playing: bool,
    disposed: bool,
    events: VecDeque<MediaEvent>,
    calls: Vec<BackendCall>,
}

impl SimulatedBackend {
    /// Create a backend that knows no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend from `(uri, duration)` pairs
    pub fn with_durations<I, S>(durations: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            durations: durations.into_iter().map(|(uri, d)| (uri.into(), d)).collect(),
            ..Self::default()
        }
    }

    /// Register a source duration
    pub fn add_source(&mut self, uri: impl Into<String>, duration: f64) {
        self.durations.insert(uri.into(), duration);
    }

    /// Advance playback by `delta_time` seconds, queueing time updates and
    /// the end event
    pub fn tick(&mut self, delta_time: f64) {
        if !self.playing || self.disposed {
            return;
        }
        let Some(loaded) = &self.loaded else {
            return;
        };
        let token = loaded.token;
        let duration = loaded.duration.unwrap_or(0.0);

        self.current_time = (self.current_time + delta_time).min(duration);
        self.events
            .push_back(MediaEvent::time_update(token, self.current_time));

        if self.current_time >= duration {
            self.playing = false;
            self.events.push_back(MediaEvent::ended(token));
        }
    }

    /// Queue a time update for the current load
    pub fn report_time(&mut self, current_time: f64) {
        if let Some(loaded) = &self.loaded {
            self.current_time = current_time;
            self.events
                .push_back(MediaEvent::time_update(loaded.token, current_time));
        }
    }

    /// Queue the end event for the current load
    pub fn report_ended(&mut self) {
        if let Some(loaded) = &self.loaded {
            self.playing = false;
            self.events.push_back(MediaEvent::ended(loaded.token));
        }
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<MediaEvent> {
        self.events.drain(..).collect()
    }

    /// Token of the most recent load
    pub fn current_token(&self) -> Option<LoadToken> {
        self.loaded.as_ref().map(|l| l.token)
    }

    /// Whether the simulated player is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether `dispose` was called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Calls received so far
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl MediaBackend for SimulatedBackend {
    fn load(&mut self, token: LoadToken, uri: &str) {
        self.calls.push(BackendCall::Load(uri.to_string()));
        let duration = self.durations.get(uri).copied();
        self.loaded = Some(LoadedSource { token, duration });
        self.current_time = 0.0;
        self.playing = false;
        self.events
            .push_back(MediaEvent::loaded_metadata(token, duration.unwrap_or(f64::NAN)));
    }

    fn play(&mut self) {
        self.calls.push(BackendCall::Play);
        if self.loaded.is_some() && !self.disposed {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.calls.push(BackendCall::Pause);
        self.playing = false;
    }

    fn seek(&mut self, time: f64) {
        self.calls.push(BackendCall::Seek(time));
        let max = self.duration().unwrap_or(0.0);
        self.current_time = time.clamp(0.0, max);
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> Option<f64> {
        self.loaded.as_ref().and_then(|l| l.duration)
    }

    fn dispose(&mut self) {
        self.calls.push(BackendCall::Dispose);
        self.disposed = true;
        self.playing = false;
        self.loaded = None;
        self.events.clear();
    }
}
