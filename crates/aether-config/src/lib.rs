//! Configuration for the Aether LUT baker.
//!
//! Settings persist to disk as RON files and can be overridden from the
//! command line via clap. Missing sections fall back to defaults and unknown
//! fields are ignored, so older and newer config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AtmosphereConfig, AtmospherePreset, Config, DebugConfig, ExecutorConfig, ExecutorKind,
    OutputConfig, TransmittanceConfig,
};
pub use error::ConfigError;
