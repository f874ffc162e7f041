//! Bake configuration with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use aether_atmosphere::Atmosphere;
use aether_multiscatter::{Executor, MultiscatteringSettings};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level bake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Which atmosphere to bake.
    pub atmosphere: AtmosphereConfig,
    /// Transmittance table consumed by the multiscattering pass.
    pub transmittance: TransmittanceConfig,
    /// Multiscattering LUT resolution and sample counts.
    pub multiscattering: MultiscatteringSettings,
    /// How grid rows are distributed over threads.
    pub executor: ExecutorConfig,
    /// Where the baked table is written.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Built-in atmosphere presets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum AtmospherePreset {
    #[default]
    Earth,
    Mars,
    /// Use [`AtmosphereConfig::custom`].
    Custom,
}

/// Atmosphere selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Preset to start from.
    pub preset: AtmospherePreset,
    /// Multiplier applied to every scattering and absorption coefficient.
    pub density_multiplier: f32,
    /// Full atmosphere description, read when `preset` is `Custom`.
    pub custom: Option<Atmosphere>,
}

impl AtmosphereConfig {
    /// Resolve the configured atmosphere and check it is physically valid.
    pub fn build(&self) -> Result<Atmosphere, ConfigError> {
        let base = match self.preset {
            AtmospherePreset::Earth => Atmosphere::EARTH,
            AtmospherePreset::Mars => Atmosphere::MARS,
            AtmospherePreset::Custom => self
                .custom
                .clone()
                .ok_or(ConfigError::MissingCustomAtmosphere)?,
        };
        let atmosphere = base.with_density_multiplier(self.density_multiplier);
        atmosphere.validate()?;
        Ok(atmosphere)
    }
}

/// Transmittance table configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransmittanceConfig {
    /// Table size `[width, height]` (altitude x view cosine).
    pub size: [u32; 2],
    /// Integration steps per texel.
    pub samples: u32,
}

/// Grid executor selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutorKind {
    Sequential,
    #[default]
    Rayon,
    Threads,
}

/// Executor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    /// Worker count for `Threads` (0 = one per logical CPU).
    pub threads: usize,
}

impl ExecutorConfig {
    pub fn build(&self) -> Executor {
        match self.kind {
            ExecutorKind::Sequential => Executor::Sequential,
            ExecutorKind::Rayon => Executor::Rayon,
            ExecutorKind::Threads => Executor::Threads(self.threads),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination file; relative paths resolve against the working directory.
    pub path: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            preset: AtmospherePreset::Earth,
            density_multiplier: 1.0,
            custom: None,
        }
    }
}

impl Default for TransmittanceConfig {
    fn default() -> Self {
        Self {
            size: [256, 64],
            samples: 40,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("multiscattering.lut"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
