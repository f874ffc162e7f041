//! Aether LUT baker.
//!
//! Resolves the configured atmosphere, bakes its transmittance table, then
//! computes the multiscattering LUT and writes it to disk.
//!
//! Run with: `cargo run -p aether-bake -- --preset mars -o mars.lut`

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use aether_atmosphere::{TransmittanceError, TransmittanceLut};
use aether_config::{CliArgs, Config, ConfigError};
use aether_multiscatter::{LutError, MultiscatteringPass};
use clap::Parser;
use glam::UVec2;
use tracing::{error, info};

/// Anything that stops a bake.
#[derive(Debug, thiserror::Error)]
enum BakeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transmittance: {0}")]
    Transmittance(#[from] TransmittanceError),

    #[error("multiscattering: {0}")]
    Lut(#[from] LutError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn bake(config: &Config) -> Result<(), BakeError> {
    let atmosphere = config.atmosphere.build()?;
    info!(
        "Atmosphere: {:?} preset, radii {:.0}..{:.0}, density x{}",
        config.atmosphere.preset,
        atmosphere.bottom_radius,
        atmosphere.top_radius,
        config.atmosphere.density_multiplier
    );

    let transmittance = TransmittanceLut::bake(
        &atmosphere,
        UVec2::from_array(config.transmittance.size),
        config.transmittance.samples,
    )?;

    let pass = MultiscatteringPass::new(&atmosphere, &transmittance, config.multiscattering)?;
    let executor = config.executor.build();
    info!("Executor: {executor:?}");
    let lut = pass.compute(&executor)?;

    let path = &config.output.path;
    output::write_lut_file(path, &lut).map_err(|source| BakeError::Write {
        path: path.clone(),
        source,
    })?;
    info!(
        "Wrote {}x{} multiscattering LUT to {}",
        lut.size.x,
        lut.size.y,
        path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aether")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    aether_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match bake(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Bake failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_config::AtmospherePreset;

    fn quick_config(output: PathBuf) -> Config {
        let mut config = Config::default();
        config.transmittance.size = [32, 16];
        config.transmittance.samples = 8;
        config.multiscattering.lut_size = UVec2::new(4, 4);
        config.multiscattering.dirs = 8;
        config.multiscattering.samples = 4;
        config.output.path = output;
        config
    }

    #[test]
    fn test_bake_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("earth.lut");
        bake(&quick_config(path.clone())).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"AEMS");
        assert_eq!(bytes.len(), 16 + 4 * 4 * 16);
    }

    #[test]
    fn test_bake_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config(dir.path().join("custom.lut"));
        config.atmosphere.preset = AtmospherePreset::Custom;
        assert!(matches!(
            bake(&config),
            Err(BakeError::Config(ConfigError::MissingCustomAtmosphere))
        ));

        let mut config = quick_config(dir.path().join("empty.lut"));
        config.multiscattering.dirs = 0;
        assert!(matches!(bake(&config), Err(BakeError::Lut(LutError::ZeroDirections))));

        let mut config = quick_config(dir.path().join("flat.lut"));
        config.transmittance.size = [0, 16];
        assert!(matches!(bake(&config), Err(BakeError::Transmittance(_))));
        assert!(!dir.path().join("flat.lut").exists());
    }
}
