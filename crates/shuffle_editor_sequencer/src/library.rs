// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source clips available for dropping onto the track.

use crate::error::{Result, SequencerError};
use crate::segment::SourceDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a library source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    /// Create a new random source ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A clip in the source list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceClip {
    /// Unique source ID
    pub id: SourceId,
    /// Display name
    pub name: String,
    /// Media locator
    pub uri: String,
    /// Whether this clip is being previewed
    #[serde(skip)]
    pub is_playing: bool,
}

impl SourceClip {
    /// Descriptor handed to the track when the clip is dropped
    pub fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::new(self.name.clone(), self.uri.clone())
    }
}

/// Ordered list of source clips; at most one is previewing at a time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceLibrary {
    clips: IndexMap<SourceId, SourceClip>,
}

impl SourceLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip
    pub fn add(&mut self, name: impl Into<String>, uri: impl Into<String>) -> SourceId {
        let id = SourceId::new();
        self.clips.insert(
            id,
            SourceClip {
                id,
                name: name.into(),
                uri: uri.into(),
                is_playing: false,
            },
        );
        id
    }

    /// Remove a clip
    pub fn remove(&mut self, id: SourceId) -> Option<SourceClip> {
        self.clips.shift_remove(&id)
    }

    /// Get a clip
    pub fn clip(&self, id: SourceId) -> Option<&SourceClip> {
        self.clips.get(&id)
    }

    /// All clips in list order
    pub fn clips(&self) -> impl Iterator<Item = &SourceClip> {
        self.clips.values()
    }

    /// Clip count
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Mark a clip as previewing; every other clip stops
    pub fn play(&mut self, id: SourceId) -> Result<()> {
        if !self.clips.contains_key(&id) {
            return Err(SequencerError::SourceNotFound(id));
        }
        for clip in self.clips.values_mut() {
            clip.is_playing = clip.id == id;
        }
        Ok(())
    }

    /// Stop previewing a clip
    pub fn pause(&mut self, id: SourceId) -> Result<()> {
        let clip = self
            .clips
            .get_mut(&id)
            .ok_or(SequencerError::SourceNotFound(id))?;
        clip.is_playing = false;
        Ok(())
    }

    /// The clip currently previewing
    pub fn playing(&self) -> Option<SourceId> {
        self.clips.values().find(|c| c.is_playing).map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_exclusive() {
        let mut library = SourceLibrary::new();
        let a = library.add("video 1", "oceans.mp4");
        let b = library.add("video 2", "ed_hd.mp4");

        library.play(a).unwrap();
        assert_eq!(library.playing(), Some(a));

        library.play(b).unwrap();
        assert_eq!(library.playing(), Some(b));
        assert_eq!(library.clips().filter(|c| c.is_playing).count(), 1);

        library.pause(b).unwrap();
        assert_eq!(library.playing(), None);
    }

    #[test]
    fn test_unknown_source() {
        let mut library = SourceLibrary::new();
        let missing = SourceId::new();
        assert_eq!(library.play(missing), Err(SequencerError::SourceNotFound(missing)));
        assert!(library.pause(missing).is_err());
    }

    #[test]
    fn test_order_is_kept_on_remove() {
        let mut library = SourceLibrary::new();
        let a = library.add("a", "a.mp4");
        let b = library.add("b", "b.mp4");
        let c = library.add("c", "c.mp4");
        library.remove(b);

        let ids: Vec<_> = library.clips().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(library.clip(a).unwrap().descriptor().uri, "a.mp4");
    }
}
