//! CLI module for BeatCut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

pub mod args;
pub mod commands;

pub use args::CutArgs;

/// BeatCut music video cutter
///
/// Detects the bass beats of an audio track and cuts random clips from a
/// directory of videos on those beats.
#[derive(Parser, Debug)]
#[command(name = "beatcut")]
#[command(about = "Cut a music video from random clips on the bass beats of a track")]
#[command(version)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, env = "BEATCUT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Configuration file (TOML or YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub cut: CutArgs,
}
