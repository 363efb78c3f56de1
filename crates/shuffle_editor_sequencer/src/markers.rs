// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ruler markers for the rendered timeline.

use serde::{Deserialize, Serialize};

/// A labelled tick on the time ruler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulerMarker {
    /// Time position in whole seconds
    pub position: f64,
    /// Display label, e.g. `"15s"`
    pub label: String,
}

impl RulerMarker {
    fn at(position: f64) -> Self {
        Self {
            position,
            label: format!("{position}s"),
        }
    }
}

/// Build the full set of ruler markers for a track.
///
/// One marker is placed roughly every `marker_pixel_width` pixels, both ends
/// included. A track too short for a single interval yields a lone marker at
/// zero.
pub fn generate(total_duration: f64, scale: f64, marker_pixel_width: f64) -> Vec<RulerMarker> {
    let track_pixel_width = total_duration * scale;
    let marker_count = if track_pixel_width.is_finite() && marker_pixel_width > 0.0 && scale > 0.0 {
        (track_pixel_width / marker_pixel_width).floor().max(0.0) as usize
    } else {
        0
    };

    if marker_count == 0 {
        return vec![RulerMarker::at(0.0)];
    }

    let step = track_pixel_width / marker_count as f64;
    (0..=marker_count)
        .map(|i| RulerMarker::at(((i as f64 * step) / scale).floor()))
        .collect()
}
