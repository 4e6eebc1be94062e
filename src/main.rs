//! BeatCut music video cutter
//!
//! Cuts random clips from a directory of MP4 files on the bass beats of an
//! audio track and muxes them with that track.
//!
//! # Usage
//!
//! ```bash
//! beatcut song.mp3 clips/ 2 -o video.mp4 --direction forward
//! beatcut song.mp3 clips/ 1 -s 0:30 -e 1:30 --speed half --seed 42
//! ```

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use beatcut_cli::cli::{commands, Cli};
use beatcut_cli::config_initialization::{initialize_configuration, initialize_logging};
use beatcut_cli::utils::format_duration;

/// Main entry point for the BeatCut CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    initialize_logging(&config, cli.log_json)?;
    beatcut_cli::init()?;

    info!("Starting BeatCut");
    let started = Instant::now();

    let report = commands::cut(&cli.cut, &config).context("Failed to create music video")?;

    info!(
        "Finished in {} ({} cuts, {:.2}s)",
        format_duration(started.elapsed()),
        report.segment_count,
        report.clamped_duration
    );
    println!("Music video created: {}", report.output_path.display());
    Ok(())
}
