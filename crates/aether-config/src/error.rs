//! Configuration error types.

use aether_atmosphere::AtmosphereError;

/// Errors that can occur when loading, saving, or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// `preset: Custom` without a `custom` atmosphere.
    #[error("atmosphere preset is Custom but no custom atmosphere is configured")]
    MissingCustomAtmosphere,

    /// The resolved atmosphere is physically invalid.
    #[error("invalid atmosphere: {0}")]
    InvalidAtmosphere(#[from] AtmosphereError),
}
