//! Command-line argument parsing for terragen hosts.

use std::path::PathBuf;

use clap::Parser;
use terragen_noise::NormalizeMode;

use crate::Config;

/// Command-line overrides shared by terragen binaries.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terragen", about = "Procedural terrain generation")]
pub struct CliArgs {
    /// World seed. Height and ridges use it directly; temperature and
    /// humidity use `seed + 1` and `seed + 2`.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i32>,

    /// Grid cells per chunk edge.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Noise normalization (local, global, none).
    #[arg(long, value_parser = parse_normalize_mode)]
    pub normalize_mode: Option<NormalizeMode>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_normalize_mode(s: &str) -> Result<NormalizeMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "local" => Ok(NormalizeMode::Local),
        "global" => Ok(NormalizeMode::Global),
        "none" => Ok(NormalizeMode::None),
        other => Err(format!("unknown normalize mode `{other}`")),
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.height.seed = seed;
            self.noise.temperature.seed = seed.wrapping_add(1);
            self.noise.humidity.seed = seed.wrapping_add(2);
            if let Some(ridges) = self.noise.ridges.as_mut() {
                ridges.seed = seed;
            }
        }
        if let Some(size) = args.chunk_size {
            self.world.chunk_size = size;
        }
        if let Some(mode) = args.normalize_mode {
            self.world.normalize_mode = mode;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
