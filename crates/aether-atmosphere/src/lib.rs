//! Planet atmosphere model for precomputed sky LUTs.
//!
//! Provides the layered [`Atmosphere`] description (Rayleigh, Mie and ozone
//! style media with configurable density profiles and phase functions), the
//! spherical-shell geometry helpers used by every ray march, and the
//! [`TransmittanceSampler`] seam through which LUT passes read precomputed
//! transmittance.

mod atmosphere;
mod geometry;
mod medium;
mod transmittance;

pub use atmosphere::{Atmosphere, AtmosphereError, AtmosphereSample, LAYER_COUNT};
pub use geometry::{
    distance_to_bottom_atmosphere_boundary, distance_to_top_atmosphere_boundary, local_r,
    local_up, max_atmosphere_distance, ray_intersects_ground,
};
pub use medium::{DensityProfile, Medium, PhaseFunction, henyey_greenstein, rayleigh};
pub use transmittance::{
    TransmittanceError, TransmittanceLut, TransmittanceSampler, march_to_top,
};
