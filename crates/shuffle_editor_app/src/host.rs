// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless host: drives a sequencer session against simulated media.

use crate::manifest::MediaManifest;
use shuffle_editor_sequencer::{
    PlaybackState, SequencerError, SequencerEvent, SequencerSession, SequencerSettings,
    SimulatedBackend, SETTINGS_FILE_NAME,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default manifest file name
pub const MANIFEST_FILE_NAME: &str = "media.ron";

/// Seconds of simulated media time per playback tick
const TICK_SECONDS: f64 = 1.0;

/// Host failures
#[derive(Debug, Error)]
pub enum HostError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),
    /// Settings file could not be read or written
    #[error("Settings file {path}: {source}")]
    Settings {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Manifest file could not be read or written
    #[error("Manifest file {path}: {source}")]
    Manifest {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Sequencer rejected an operation
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
    /// Playback never reached the end of the track
    #[error("Playback stalled at {0:.3}s")]
    Stalled(f64),
}

/// What the host was asked to do
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostConfig {
    /// Optional RON settings file
    pub settings_path: Option<PathBuf>,
    /// Optional RON media manifest
    pub manifest_path: Option<PathBuf>,
    /// Write default settings and manifest into this directory and exit
    pub write_defaults: Option<PathBuf>,
}

impl HostConfig {
    /// Parse command line arguments (without the program name)
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, HostError> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "--settings" => &mut config.settings_path,
                "--manifest" => &mut config.manifest_path,
                "--write-defaults" => &mut config.write_defaults,
                other => return Err(HostError::Usage(format!("Unknown argument: {other}"))),
            };
            let value = args
                .next()
                .ok_or_else(|| HostError::Usage(format!("{arg} expects a path")))?;
            *slot = Some(PathBuf::from(value));
        }
        Ok(config)
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Segment names in track order
    pub segments: Vec<String>,
    /// Track length in seconds
    pub total_duration: f64,
    /// Playhead position when playback stopped
    pub final_position: f64,
    /// Number of ruler markers
    pub marker_count: usize,
    /// Events observed over the run
    pub event_count: usize,
}

/// Write a default settings file and manifest into `dir`
pub fn write_defaults(dir: &Path) -> Result<(), HostError> {
    let settings_path = dir.join(SETTINGS_FILE_NAME);
    SequencerSettings::default()
        .save(&settings_path)
        .map_err(|source| HostError::Settings {
            path: settings_path.clone(),
            source,
        })?;

    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    MediaManifest::default()
        .save(&manifest_path)
        .map_err(|source| HostError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

    tracing::info!(
        "Wrote {} and {}",
        settings_path.display(),
        manifest_path.display()
    );
    Ok(())
}

/// Load configuration, build a track from every manifest source and play it
/// through to the end.
pub fn run(config: &HostConfig) -> Result<RunSummary, HostError> {
    let settings = match &config.settings_path {
        Some(path) => SequencerSettings::load(path).map_err(|source| HostError::Settings {
            path: path.clone(),
            source,
        })?,
        None => SequencerSettings::default(),
    };
    let manifest = match &config.manifest_path {
        Some(path) => MediaManifest::load(path).map_err(|source| HostError::Manifest {
            path: path.clone(),
            source,
        })?,
        None => MediaManifest::default(),
    };

    let mut session = SequencerSession::new(settings, manifest.backend(), manifest.backend());
    manifest.populate(session.library_mut());
    let mut event_count = 0;

    // Drop every library clip at the end of the track
    let sources: Vec<_> = session.library().clips().map(|c| c.id).collect();
    for (index, source) in sources.into_iter().enumerate() {
        session.insert_from_library(source, index)?;
    }
    event_count += pump(&mut session);

    for (index, segment) in session.segments().iter().enumerate() {
        tracing::info!(
            "Segment {}: {} [{:.3}s, {:.3}s)",
            index,
            segment.name,
            segment.start_time,
            segment.end_time
        );
    }
    let labels: Vec<_> = session.markers().iter().map(|m| m.label.as_str()).collect();
    tracing::info!("Ruler: {}", labels.join(" "));

    session.play();
    event_count += pump(&mut session);

    let max_ticks =
        (session.total_duration() / TICK_SECONDS).ceil() as usize + session.segments().len() + 1;
    for _ in 0..max_ticks {
        if session.playback_state() != PlaybackState::Playing {
            break;
        }
        session.player_mut().tick(TICK_SECONDS);
        event_count += pump(&mut session);
    }

    if session.playback_state() == PlaybackState::Playing {
        return Err(HostError::Stalled(session.global_position()));
    }
    tracing::info!(
        "Playback finished at {:.3}s of {:.3}s",
        session.global_position(),
        session.total_duration()
    );

    let summary = RunSummary {
        segments: session.segments().iter().map(|s| s.name.clone()).collect(),
        total_duration: session.total_duration(),
        final_position: session.global_position(),
        marker_count: session.markers().len(),
        event_count,
    };
    session.dispose();
    Ok(summary)
}

/// Deliver queued media callbacks until both backends are quiet; returns the
/// number of sequencer events drained.
fn pump(session: &mut SequencerSession<SimulatedBackend>) -> usize {
    let mut drained = 0;
    loop {
        let mut media = session.probe_backend_mut().take_events();
        media.extend(session.player_mut().take_events());

        for event in session.take_events() {
            log_event(&event);
            drained += 1;
        }
        if media.is_empty() {
            return drained;
        }
        for event in &media {
            session.handle_media_event(event);
        }
    }
}

fn log_event(event: &SequencerEvent) {
    match event {
        SequencerEvent::TrackIndexChanged(index) => tracing::info!("Now playing segment {}", index),
        SequencerEvent::PlaybackStateChanged(state) => tracing::info!("Playback {:?}", state),
        SequencerEvent::GlobalPositionChanged(position) => {
            tracing::trace!("Position {:.3}s", position);
        }
        other => tracing::debug!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let config =
            HostConfig::from_args(args(&["--settings", "a.ron", "--manifest", "b.ron"])).unwrap();
        assert_eq!(config.settings_path, Some(PathBuf::from("a.ron")));
        assert_eq!(config.manifest_path, Some(PathBuf::from("b.ron")));
        assert_eq!(config.write_defaults, None);

        assert_eq!(HostConfig::from_args(Vec::new()).unwrap(), HostConfig::default());
        assert!(matches!(
            HostConfig::from_args(args(&["--verbose"])),
            Err(HostError::Usage(_))
        ));
        assert!(matches!(
            HostConfig::from_args(args(&["--settings"])),
            Err(HostError::Usage(_))
        ));
    }

    #[test]
    fn test_default_run_plays_to_end() {
        let summary = run(&HostConfig::default()).unwrap();
        assert_eq!(summary.segments, vec!["video 1", "video 2", "video 3"]);
        assert!((summary.total_duration - 730.4).abs() < 1e-9);
        assert_eq!(summary.final_position, summary.total_duration);
        assert!(summary.marker_count > 1);
        assert!(summary.event_count > 0);
    }

    #[test]
    fn test_defaults_round_trip() {
        let dir = std::env::temp_dir().join(format!("shuffle-editor-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        write_defaults(&dir).unwrap();

        let config = HostConfig {
            settings_path: Some(dir.join(SETTINGS_FILE_NAME)),
            manifest_path: Some(dir.join(MANIFEST_FILE_NAME)),
            write_defaults: None,
        };
        let summary = run(&config).unwrap();
        assert_eq!(summary.segments.len(), 3);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_settings_file() {
        let config = HostConfig {
            settings_path: Some(PathBuf::from("/nonexistent/sequencer.ron")),
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(HostError::Settings { .. })));
    }
}
