// SPDX-License-Identifier: MIT OR Apache-2.0
//! Duration probing for dropped clips.
//!
//! A clip only joins the track once its duration is known. Drops are queued
//! and probed one at a time on a dedicated backend, so a metadata callback can
//! never be confused with the one of a newer load.

use crate::backend::{LoadToken, MediaBackend, MediaEvent, MediaEventKind};
use crate::segment::SourceDescriptor;
use indexmap::IndexMap;

/// A drop waiting for its duration
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInsert {
    /// Dropped source
    pub source: SourceDescriptor,
    /// Requested track index
    pub at_index: usize,
}

/// A drop whose duration has resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInsert {
    /// Load that resolved
    pub token: LoadToken,
    /// The queued request
    pub insert: PendingInsert,
    /// Reported duration in seconds
    pub duration: f64,
}

/// FIFO metadata prober over a media backend
#[derive(Debug)]
pub struct DurationProbe<B> {
    backend: B,
    queue: IndexMap<LoadToken, PendingInsert>,
    in_flight: Option<LoadToken>,
}

impl<B: MediaBackend> DurationProbe<B> {
    /// Create a prober that owns `backend`
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            queue: IndexMap::new(),
            in_flight: None,
        }
    }

    /// Queue a source for probing; returns the token its metadata will carry
    pub fn request(&mut self, source: SourceDescriptor, at_index: usize) -> LoadToken {
        let token = LoadToken::new();
        self.queue.insert(token, PendingInsert { source, at_index });
        self.start_next();
        token
    }

    /// Whether `token` belongs to a queued probe
    pub fn owns(&self, token: LoadToken) -> bool {
        self.queue.contains_key(&token)
    }

    /// Feed a media event; yields the insert once its metadata arrives
    pub fn handle(&mut self, event: &MediaEvent) -> Option<ResolvedInsert> {
        if self.in_flight != Some(event.token) {
            return None;
        }
        let MediaEventKind::LoadedMetadata { duration } = event.kind else {
            return None;
        };

        self.in_flight = None;
        let insert = self.queue.shift_remove(&event.token)?;
        self.start_next();

        Some(ResolvedInsert {
            token: event.token,
            insert,
            duration,
        })
    }

    /// Number of drops still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The probing backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The probing backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Drop every queued probe and release the backend
    pub fn dispose(&mut self) {
        self.queue.clear();
        self.in_flight = None;
        self.backend.dispose();
    }

    fn start_next(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        if let Some((token, pending)) = self.queue.first() {
            tracing::debug!("Probing duration of {}", pending.source.uri);
            self.backend.load(*token, &pending.source.uri);
            self.in_flight = Some(*token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, SimulatedBackend};

    fn probe() -> DurationProbe<SimulatedBackend> {
        DurationProbe::new(SimulatedBackend::with_durations([("a.mp4", 5.0), ("b.mp4", 7.0)]))
    }

    #[test]
    fn test_single_probe_resolves() {
        let mut probe = probe();
        let token = probe.request(SourceDescriptor::new("a", "a.mp4"), 0);
        assert!(probe.owns(token));

        let events = probe.backend_mut().take_events();
        let resolved = probe.handle(&events[0]).unwrap();
        assert_eq!(resolved.token, token);
        assert_eq!(resolved.duration, 5.0);
        assert_eq!(resolved.insert.at_index, 0);
        assert_eq!(probe.pending(), 0);
    }

    #[test]
    fn test_probes_are_serialized() {
        let mut probe = probe();
        probe.request(SourceDescriptor::new("a", "a.mp4"), 0);
        probe.request(SourceDescriptor::new("b", "b.mp4"), 1);

        // Only the first source has been loaded
        assert_eq!(probe.backend().calls(), &[BackendCall::Load("a.mp4".to_string())]);

        let first = probe.backend_mut().take_events();
        assert_eq!(probe.handle(&first[0]).unwrap().insert.source.uri, "a.mp4");

        let second = probe.backend_mut().take_events();
        assert_eq!(probe.handle(&second[0]).unwrap().duration, 7.0);
        assert_eq!(probe.pending(), 0);
    }

    #[test]
    fn test_foreign_and_repeated_events_are_ignored() {
        let mut probe = probe();
        probe.request(SourceDescriptor::new("a", "a.mp4"), 0);

        let foreign = MediaEvent::loaded_metadata(LoadToken::new(), 1.0);
        assert!(probe.handle(&foreign).is_none());

        let events = probe.backend_mut().take_events();
        let time_update = MediaEvent::time_update(events[0].token, 1.0);
        assert!(probe.handle(&time_update).is_none());

        assert!(probe.handle(&events[0]).is_some());
        assert!(probe.handle(&events[0]).is_none());
    }
}
