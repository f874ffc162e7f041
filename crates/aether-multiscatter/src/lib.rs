//! Multiscattering lookup table for physically based sky rendering.
//!
//! For every `(r, mu)` cell of a small 2D grid the pass marches a fixed set
//! of quasi-random directions through the [`Atmosphere`], averages the
//! second-order radiance `l_2` and the transfer factor `f_ms`, and closes the
//! infinite scattering series as `l_2 / (1 - f_ms)`. A renderer then adds the
//! higher-order bounces with one texture fetch per pixel.
//!
//! ```no_run
//! use aether_atmosphere::{Atmosphere, TransmittanceLut};
//! use aether_multiscatter::{MultiscatteringPass, MultiscatteringSettings, RayonExecutor};
//! use glam::UVec2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let atmosphere = Atmosphere::EARTH;
//! let transmittance = TransmittanceLut::bake(&atmosphere, UVec2::new(256, 64), 40)?;
//! let pass = MultiscatteringPass::new(&atmosphere, &transmittance, MultiscatteringSettings::default())?;
//! let lut = pass.compute(&RayonExecutor)?;
//! # let _ = lut;
//! # Ok(())
//! # }
//! ```
//!
//! [`Atmosphere`]: aether_atmosphere::Atmosphere

mod error;
mod estimator;
mod executor;
mod integrator;
mod lut;
mod parametrization;
mod pass;
mod sampler;
mod settings;

pub use error::LutError;
pub use estimator::{LutTexel, close_series, estimate_multiscattering, light_direction, to_texel};
pub use executor::{Executor, GridExecutor, RayonExecutor, SequentialExecutor, ThreadPoolExecutor};
pub use integrator::{
    MultiscatteringSample, RayMarch, RayMarchSample, ground_bounce, sample_multiscattering_dir,
};
pub use lut::MultiscatteringLut;
pub use parametrization::{LinearParametrization, Parametrization};
pub use pass::MultiscatteringPass;
pub use sampler::{DirectionSampler, s2_sequence, sample_direction, uv_to_sphere};
pub use settings::MultiscatteringSettings;
