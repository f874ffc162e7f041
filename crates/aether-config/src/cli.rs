//! Command-line argument parsing for the LUT baker.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::{AtmospherePreset, ExecutorKind};

/// Aether LUT baker command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "aether-bake", about = "Bake the atmosphere multiscattering LUT")]
pub struct CliArgs {
    /// LUT width (light cosine axis).
    #[arg(long)]
    pub width: Option<u32>,

    /// LUT height (altitude axis).
    #[arg(long)]
    pub height: Option<u32>,

    /// Directions sampled per texel.
    #[arg(long)]
    pub dirs: Option<u32>,

    /// March steps per sampled direction.
    #[arg(long)]
    pub samples: Option<u32>,

    /// Atmosphere preset.
    #[arg(long, value_enum)]
    pub preset: Option<AtmospherePreset>,

    /// Grid executor.
    #[arg(long, value_enum)]
    pub executor: Option<ExecutorKind>,

    /// Worker threads for the `threads` executor (0 = one per CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.multiscattering.lut_size.x = w;
        }
        if let Some(h) = args.height {
            self.multiscattering.lut_size.y = h;
        }
        if let Some(dirs) = args.dirs {
            self.multiscattering.dirs = dirs;
        }
        if let Some(samples) = args.samples {
            self.multiscattering.samples = samples;
        }
        if let Some(preset) = args.preset {
            self.atmosphere.preset = preset;
        }
        if let Some(kind) = args.executor {
            self.executor.kind = kind;
        }
        if let Some(threads) = args.threads {
            self.executor.threads = threads;
        }
        if let Some(ref path) = args.output {
            self.output.path = path.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
