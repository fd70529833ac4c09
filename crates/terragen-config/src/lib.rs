//! Configuration for terragen sessions.
//!
//! Settings persist to disk as RON, are validated before any generation
//! starts, and can be overridden from the command line via clap.

mod cli;
mod config;
mod error;
mod validate;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, CurveConfig, DebugConfig, NoiseConfig, WaterConfig, WorldConfig,
    default_biomes,
};
pub use error::{ConfigError, ValidationError};
pub use validate::ResolvedWater;
