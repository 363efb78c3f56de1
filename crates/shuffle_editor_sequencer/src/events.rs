// SPDX-License-Identifier: MIT OR Apache-2.0
//! Notifications published by the sequencer.

use crate::library::SourceId;
use crate::markers::RulerMarker;
use crate::playback::PlaybackState;
use crate::segment::{Segment, SegmentId};
use std::sync::mpsc;

/// Something observers of the sequencer may care about
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    /// The track changed structurally or a segment was edited; carries the
    /// full updated list
    TrackChanged(Vec<Segment>),
    /// The ruler was rebuilt
    MarkersChanged(Vec<RulerMarker>),
    /// Global playhead position in seconds
    GlobalPositionChanged(f64),
    /// The segment being played changed
    TrackIndexChanged(usize),
    /// Player state changed
    PlaybackStateChanged(PlaybackState),
    /// The user picked a position on the track
    UserPositionChanged {
        /// Segment index
        track_index: usize,
        /// Seconds into the segment
        local: f64,
    },
    /// Selection changed
    SegmentSelected(Option<SegmentId>),
    /// A segment was removed from the track
    SegmentDeleted(SegmentId),
    /// A segment's name or color changed
    SegmentEdited(SegmentId),
    /// A library source started or stopped previewing
    PreviewChanged {
        /// Source being previewed
        source: SourceId,
        /// Whether it is now playing
        playing: bool,
    },
}

/// Single dispatch point for [`SequencerEvent`]s.
///
/// Events are queued for [`EventBus::take_events`] and also forwarded to
/// every live channel subscriber, in emission order.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<SequencerEvent>,
    subscribers: Vec<mpsc::Sender<SequencerEvent>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event
    pub fn emit(&mut self, event: SequencerEvent) {
        // Receivers that were dropped are pruned here
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
        self.pending.push(event);
    }

    /// Publish several events in order
    pub fn extend(&mut self, events: impl IntoIterator<Item = SequencerEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Get queued events and clear them
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Open a channel that receives every future event
    pub fn subscribe(&mut self) -> mpsc::Receiver<SequencerEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_events_drains_in_order() {
        let mut bus = EventBus::new();
        bus.emit(SequencerEvent::TrackIndexChanged(1));
        bus.emit(SequencerEvent::GlobalPositionChanged(2.0));

        assert_eq!(
            bus.take_events(),
            vec![
                SequencerEvent::TrackIndexChanged(1),
                SequencerEvent::GlobalPositionChanged(2.0),
            ]
        );
        assert!(bus.take_events().is_empty());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let mut bus = EventBus::new();
        let receiver = bus.subscribe();
        bus.emit(SequencerEvent::SegmentSelected(None));

        assert_eq!(receiver.try_recv().unwrap(), SequencerEvent::SegmentSelected(None));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let receiver = bus.subscribe();
        let _kept = bus.subscribe();
        drop(receiver);

        bus.emit(SequencerEvent::TrackIndexChanged(0));
        assert_eq!(bus.subscriber_count(), 1);
    }
}
