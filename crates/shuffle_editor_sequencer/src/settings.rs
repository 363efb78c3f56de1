// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer settings.
//!
//! Settings are stored as pretty-printed RON:
//! - Horizontal scale (pixels per second)
//! - Ruler marker spacing
//! - Segment color palette
//! - What happens to the playhead when a delete shortens the track

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "sequencer.ron";

/// Default ruler marker spacing in pixels
pub const DEFAULT_MARKER_PIXEL_WIDTH: f64 = 50.0;

/// Default segment palette: red, green, blue, yellow, brown, gold, orange
pub const DEFAULT_PALETTE: [[u8; 3]; 7] = [
    [255, 0, 0],
    [0, 128, 0],
    [0, 0, 255],
    [255, 255, 0],
    [165, 42, 42],
    [255, 215, 0],
    [255, 165, 0],
];

/// How the global position is corrected when a delete leaves it past the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverrunPolicy {
    /// Move the playhead to the new end of the track
    #[default]
    ClampToEnd,
    /// Move the playhead back to the start of the track
    ResetToStart,
}

impl OverrunPolicy {
    /// Correct `position` against the new total duration
    pub fn apply(self, position: f64, total_duration: f64) -> f64 {
        if position <= total_duration {
            return position;
        }
        match self {
            OverrunPolicy::ClampToEnd => total_duration,
            OverrunPolicy::ResetToStart => 0.0,
        }
    }
}

/// Tunables for a sequencer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSettings {
    /// Horizontal zoom (pixels per second)
    pub scale: f64,
    /// Distance between ruler markers in pixels
    pub marker_pixel_width: f64,
    /// Colors assigned to segments by insertion order
    pub palette: Vec<[u8; 3]>,
    /// Playhead correction after a delete
    pub overrun_policy: OverrunPolicy,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            marker_pixel_width: DEFAULT_MARKER_PIXEL_WIDTH,
            palette: DEFAULT_PALETTE.to_vec(),
            overrun_policy: OverrunPolicy::default(),
        }
    }
}

impl SequencerSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: SequencerSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.palette.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Palette must contain at least one color",
            ));
        }

        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

/// Color for the segment placed at position `index`. An empty palette falls
/// back to [`DEFAULT_PALETTE`].
pub fn palette_color(palette: &[[u8; 3]], index: usize) -> [u8; 3] {
    if palette.is_empty() {
        return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()];
    }
    palette[index % palette.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SequencerSettings::default();
        assert_eq!(settings.scale, 1.0);
        assert_eq!(settings.marker_pixel_width, 50.0);
        assert_eq!(settings.palette.len(), 7);
        assert_eq!(settings.overrun_policy, OverrunPolicy::ClampToEnd);
    }

    #[test]
    fn test_serialization() {
        let settings = SequencerSettings {
            scale: 12.5,
            overrun_policy: OverrunPolicy::ResetToStart,
            ..Default::default()
        };
        let ron_str =
            ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: SequencerSettings = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: SequencerSettings = ron::from_str("(scale: 4.0)").unwrap();
        assert_eq!(loaded.scale, 4.0);
        assert_eq!(loaded.marker_pixel_width, DEFAULT_MARKER_PIXEL_WIDTH);
        assert_eq!(loaded.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "shuffle-{}-{}",
            std::process::id(),
            SETTINGS_FILE_NAME
        ));
        let settings = SequencerSettings {
            marker_pixel_width: 80.0,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = SequencerSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_palette_wraps() {
        let settings = SequencerSettings::default();
        assert_eq!(palette_color(&settings.palette, 0), DEFAULT_PALETTE[0]);
        assert_eq!(palette_color(&settings.palette, 7), DEFAULT_PALETTE[0]);
        assert_eq!(palette_color(&settings.palette, 9), DEFAULT_PALETTE[2]);

        let custom = [[1, 1, 1], [2, 2, 2]];
        assert_eq!(palette_color(&custom, 3), [2, 2, 2]);
        assert_eq!(palette_color(&[], 8), DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_overrun_policies() {
        assert_eq!(OverrunPolicy::ClampToEnd.apply(50.0, 30.0), 30.0);
        assert_eq!(OverrunPolicy::ResetToStart.apply(50.0, 30.0), 0.0);
        assert_eq!(OverrunPolicy::ClampToEnd.apply(20.0, 30.0), 20.0);
        assert_eq!(OverrunPolicy::ResetToStart.apply(20.0, 30.0), 20.0);
    }
}
