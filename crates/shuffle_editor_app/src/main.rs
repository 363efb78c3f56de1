// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shuffle Editor - headless sequencer host
//!
//! Loads sequencer settings and a media manifest, drops every source onto
//! the track and plays the result through a simulated media backend.
//!
//! ## Usage
//!
//! ```text
//! shuffle_editor [--settings <file>] [--manifest <file>]
//! shuffle_editor --write-defaults <dir>
//! ```

mod host;
mod manifest;

use host::HostConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() -> Result<(), tracing_subscriber::filter::ParseError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("shuffle_editor_app=debug".parse()?)
        .add_directive("shuffle_editor_sequencer=debug".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Invalid log filter: {e}");
        std::process::exit(1);
    }

    tracing::info!("Starting Shuffle Editor v{}", env!("CARGO_PKG_VERSION"));

    let result = HostConfig::from_args(std::env::args().skip(1)).and_then(|config| {
        match &config.write_defaults {
            Some(dir) => host::write_defaults(dir),
            None => host::run(&config).map(|summary| {
                tracing::info!(
                    "Played {} segments ({:.3}s), {} events",
                    summary.segments.len(),
                    summary.total_duration,
                    summary.event_count
                );
            }),
        }
    });

    if let Err(e) = result {
        tracing::error!("Shuffle Editor failed: {e}");
        std::process::exit(1);
    }
}
