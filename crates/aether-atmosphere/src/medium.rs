//! Participating media: density profiles, phase functions, and the [`Medium`] layer type.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const FRAC_1_4_PI: f32 = 1.0 / (4.0 * PI);
const FRAC_3_16_PI: f32 = 3.0 / (16.0 * PI);
const FRAC_3_8_PI: f32 = 3.0 / (8.0 * PI);

/// How the density of a medium changes with altitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DensityProfile {
    /// `density = exp(-altitude / scale_height)`. The scale height must be positive.
    Exponential {
        /// Falloff distance, in the same length unit as the planet radii.
        scale_height: f32,
    },
    /// Tent-shaped band around `center_altitude`, zero outside `layer_width`.
    Tent {
        /// Altitude where the density peaks at 1.0.
        center_altitude: f32,
        /// Full width of the band at zero density.
        layer_width: f32,
        /// Shaping exponent applied to the linear tent.
        exponent: f32,
    },
}

impl DensityProfile {
    /// Relative density (0.0 to 1.0) at the given altitude above the ground.
    pub fn density(&self, altitude: f32) -> f32 {
        match *self {
            Self::Exponential { scale_height } => (-altitude / scale_height).exp(),
            Self::Tent {
                center_altitude,
                layer_width,
                exponent,
            } => {
                if layer_width <= 0.0 {
                    return 0.0;
                }
                let half_width = layer_width * 0.5;
                let tent = (1.0 - (altitude - center_altitude).abs() / half_width).max(0.0);
                tent.powf(exponent)
            }
        }
    }

    /// The same profile with altitudes expressed in a unit `scale` times larger.
    pub fn scaled(self, scale: f32) -> Self {
        match self {
            Self::Exponential { scale_height } => Self::Exponential {
                scale_height: scale_height * scale,
            },
            Self::Tent {
                center_altitude,
                layer_width,
                exponent,
            } => Self::Tent {
                center_altitude: center_altitude * scale,
                layer_width: layer_width * scale,
                exponent,
            },
        }
    }
}

/// Angular distribution of light scattered by a medium.
///
/// Every variant is evaluated at `nu`, the cosine of the angle between the
/// ray direction and the direction toward the light.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PhaseFunction {
    /// Rayleigh phase function for molecules.
    Rayleigh,
    /// Henyey-Greenstein lobe with asymmetry `g`.
    HenyeyGreenstein(f32),
    /// Cornette-Shanks lobe with asymmetry `g`, a Henyey-Greenstein variant
    /// with a Rayleigh-like `(1 + nu^2)` factor.
    CornetteShanks(f32),
    /// Blend of two Henyey-Greenstein lobes `(g1, g2, weight)`, weight of the second lobe.
    DualLobe(f32, f32, f32),
}

impl PhaseFunction {
    /// Evaluate the phase function. The result integrates to 1 over the sphere.
    pub fn eval(&self, nu: f32) -> f32 {
        match *self {
            Self::Rayleigh => rayleigh(nu),
            Self::HenyeyGreenstein(g) => henyey_greenstein(nu, g),
            Self::CornetteShanks(g) => cornette_shanks(nu, g),
            Self::DualLobe(g1, g2, w) => {
                henyey_greenstein(nu, g1) * (1.0 - w) + henyey_greenstein(nu, g2) * w
            }
        }
    }
}

/// Rayleigh phase: `3 / (16 pi) * (1 + nu^2)`.
pub fn rayleigh(nu: f32) -> f32 {
    FRAC_3_16_PI * (1.0 + nu * nu)
}

/// Henyey-Greenstein phase with asymmetry parameter `g`.
pub fn henyey_greenstein(nu: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = 1.0 + g2 - 2.0 * g * nu;
    FRAC_1_4_PI * (1.0 - g2) / (denom * denom.sqrt())
}

fn cornette_shanks(nu: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = 1.0 + g2 - 2.0 * g * nu;
    FRAC_3_8_PI * (1.0 - g2) * (1.0 + nu * nu) / ((2.0 + g2) * denom * denom.sqrt())
}

/// One layer of the atmosphere: a medium that scatters and absorbs light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    /// Scattering coefficient at density 1.0, per unit length (RGB).
    pub scattering: Vec3,
    /// Absorption coefficient at density 1.0, per unit length (RGB).
    pub absorption: Vec3,
    /// Density as a function of altitude.
    pub density_profile: DensityProfile,
    /// Phase function used for light scattered by this layer.
    pub phase_function: PhaseFunction,
}

impl Medium {
    /// A layer that neither scatters nor absorbs.
    pub const EMPTY: Self = Self {
        scattering: Vec3::ZERO,
        absorption: Vec3::ZERO,
        density_profile: DensityProfile::Tent {
            center_altitude: 0.0,
            layer_width: 0.0,
            exponent: 1.0,
        },
        phase_function: PhaseFunction::Rayleigh,
    };

    /// Extinction coefficient at density 1.0.
    pub fn extinction(&self) -> Vec3 {
        self.scattering + self.absorption
    }
}
