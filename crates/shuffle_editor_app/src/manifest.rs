// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media manifest: the source clips offered for dropping, with the durations
//! the simulated backend reports for them.

use serde::{Deserialize, Serialize};
use shuffle_editor_sequencer::{SimulatedBackend, SourceLibrary};
use std::path::Path;

/// Current manifest format version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// One droppable source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSource {
    /// Display name
    pub name: String,
    /// Media locator
    pub uri: String,
    /// Duration the simulated backend reports, in seconds
    pub duration: f64,
}

impl ManifestSource {
    fn new(name: &str, uri: &str, duration: f64) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
            duration,
        }
    }
}

/// Source list loaded from RON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaManifest {
    /// Format version
    pub version: u32,
    /// Sources in list order
    pub sources: Vec<ManifestSource>,
}

impl Default for MediaManifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_FORMAT_VERSION,
            sources: vec![
                ManifestSource::new("video 1", "//vjs.zencdn.net/v/oceans.mp4", 46.6),
                ManifestSource::new(
                    "video 2",
                    "//d2zihajmogu5jn.cloudfront.net/elephantsdream/ed_hd.mp4",
                    653.8,
                ),
                ManifestSource::new("video 3", "assets/video-2.mp4", 30.0),
            ],
        }
    }
}

impl MediaManifest {
    /// Load a manifest from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: MediaManifest = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if manifest.version > MANIFEST_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Manifest version {} is newer than supported version {}",
                    manifest.version, MANIFEST_FORMAT_VERSION
                ),
            ));
        }

        Ok(manifest)
    }

    /// Save the manifest to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// A simulated backend that knows every source's duration
    pub fn backend(&self) -> SimulatedBackend {
        SimulatedBackend::with_durations(
            self.sources
                .iter()
                .map(|s| (s.uri.clone(), s.duration)),
        )
    }

    /// Fill a source library in manifest order
    pub fn populate(&self, library: &mut SourceLibrary) {
        for source in &self.sources {
            library.add(source.name.clone(), source.uri.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuffle_editor_sequencer::MediaBackend;

    #[test]
    fn test_default_manifest() {
        let manifest = MediaManifest::default();
        assert_eq!(manifest.version, MANIFEST_FORMAT_VERSION);
        assert_eq!(manifest.sources.len(), 3);
        assert_eq!(manifest.sources[0].name, "video 1");
    }

    #[test]
    fn test_serialization() {
        let manifest = MediaManifest::default();
        let ron_str =
            ron::ser::to_string_pretty(&manifest, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: MediaManifest = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let path = std::env::temp_dir().join(format!("manifest-{}.ron", uuid::Uuid::new_v4()));
        let manifest = MediaManifest {
            version: MANIFEST_FORMAT_VERSION + 1,
            sources: Vec::new(),
        };
        manifest.save(&path).unwrap();

        let err = MediaManifest::load(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_backend_knows_durations() {
        let manifest = MediaManifest::default();
        let mut backend = manifest.backend();
        backend.load(shuffle_editor_sequencer::LoadToken::new(), "assets/video-2.mp4");
        assert_eq!(backend.duration(), Some(30.0));

        let mut library = SourceLibrary::new();
        manifest.populate(&mut library);
        let names: Vec<_> = library.clips().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["video 1", "video 2", "video 3"]);
    }
}
