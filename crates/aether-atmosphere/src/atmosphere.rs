//! Planet atmosphere description and local medium sampling.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::medium::{DensityProfile, Medium, PhaseFunction};

/// Number of media layered in an [`Atmosphere`].
pub const LAYER_COUNT: usize = 3;

/// Physical description of a planet's atmosphere.
///
/// All lengths share one unit (the presets use meters); scattering and
/// absorption coefficients are per that unit. The struct is immutable input
/// for every LUT pass and is shared read-only across worker threads.
///
/// Layers are evaluated independently and summed, so the classic setup is
/// layer 0 = Rayleigh (molecules), layer 1 = Mie (aerosols), layer 2 = ozone
/// (absorption only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Radius of the planet surface.
    pub bottom_radius: f32,
    /// Radius where the atmosphere is considered to end.
    pub top_radius: f32,
    /// Average albedo of the ground, used for the ground bounce term.
    pub ground_albedo: Vec3,
    /// The media composing the atmosphere.
    pub layers: [Medium; LAYER_COUNT],
}

impl Atmosphere {
    /// Earth-like atmosphere in meters, over a black ground.
    pub const EARTH: Self = Self {
        bottom_radius: 6_360_000.0,
        top_radius: 6_460_000.0,
        ground_albedo: Vec3::ZERO,
        layers: [
            Medium {
                scattering: Vec3::new(5.802e-6, 13.558e-6, 33.100e-6),
                absorption: Vec3::ZERO,
                density_profile: DensityProfile::Exponential {
                    scale_height: 8_000.0,
                },
                phase_function: PhaseFunction::Rayleigh,
            },
            Medium {
                scattering: Vec3::splat(3.996e-6),
                absorption: Vec3::splat(0.444e-6),
                density_profile: DensityProfile::Exponential {
                    scale_height: 1_200.0,
                },
                phase_function: PhaseFunction::CornetteShanks(0.8),
            },
            Medium {
                scattering: Vec3::ZERO,
                absorption: Vec3::new(0.650e-6, 1.881e-6, 0.085e-6),
                density_profile: DensityProfile::Tent {
                    center_altitude: 25_000.0,
                    layer_width: 30_000.0,
                    exponent: 1.0,
                },
                phase_function: PhaseFunction::Rayleigh,
            },
        ],
    };

    /// Mars-like atmosphere in meters: CO2 and dust, no ozone.
    pub const MARS: Self = Self {
        bottom_radius: 3_389_500.0,
        top_radius: 3_509_500.0,
        ground_albedo: Vec3::splat(0.1),
        layers: [
            Medium {
                scattering: Vec3::new(0.019918e-3, 0.01357e-3, 0.00575e-3),
                absorption: Vec3::ZERO,
                density_profile: DensityProfile::Exponential {
                    scale_height: 10_430.0,
                },
                phase_function: PhaseFunction::Rayleigh,
            },
            Medium {
                scattering: Vec3::splat(5.361771e-5),
                absorption: Vec3::splat(5.530838e-7),
                density_profile: DensityProfile::Exponential {
                    scale_height: 3_095.0,
                },
                phase_function: PhaseFunction::CornetteShanks(0.85),
            },
            Medium::EMPTY,
        ],
    };

    /// Scale every layer's scattering and absorption by `mult`.
    pub fn with_density_multiplier(mut self, mult: f32) -> Self {
        for layer in self.layers.iter_mut() {
            layer.scattering *= mult;
            layer.absorption *= mult;
        }
        self
    }

    /// Express every length in a different unit: radii and profile
    /// altitudes are multiplied by `scale`, coefficients divided by it.
    ///
    /// `Atmosphere::EARTH.with_length_scale(1e-3)` is Earth in kilometers.
    pub fn with_length_scale(mut self, scale: f32) -> Self {
        self.bottom_radius *= scale;
        self.top_radius *= scale;
        for layer in self.layers.iter_mut() {
            layer.scattering /= scale;
            layer.absorption /= scale;
            layer.density_profile = layer.density_profile.scaled(scale);
        }
        self
    }

    /// Thickness of the atmosphere shell.
    pub fn thickness(&self) -> f32 {
        self.top_radius - self.bottom_radius
    }

    /// Sample the medium at distance `r` from the planet center.
    ///
    /// The altitude is clamped to the atmosphere shell, so points marginally
    /// outside it (from floating-point drift at the end of a march) read the
    /// boundary values.
    pub fn sample(&self, r: f32) -> AtmosphereSample {
        let altitude = r.clamp(self.bottom_radius, self.top_radius) - self.bottom_radius;

        let mut scattering = [Vec3::ZERO; LAYER_COUNT];
        let mut extinction = Vec3::ZERO;
        for (slot, layer) in scattering.iter_mut().zip(&self.layers) {
            let density = layer.density_profile.density(altitude);
            *slot = layer.scattering * density;
            extinction += layer.extinction() * density;
        }

        AtmosphereSample {
            scattering,
            extinction,
        }
    }

    /// Check the physical preconditions every LUT pass relies on.
    ///
    /// The passes themselves never call this; it is the responsibility of
    /// whoever builds the atmosphere.
    pub fn validate(&self) -> Result<(), AtmosphereError> {
        if !self.bottom_radius.is_finite() || self.bottom_radius <= 0.0 {
            return Err(AtmosphereError::InvalidBottomRadius(self.bottom_radius));
        }
        if !self.top_radius.is_finite() || self.top_radius <= self.bottom_radius {
            return Err(AtmosphereError::TopBelowBottom {
                bottom: self.bottom_radius,
                top: self.top_radius,
            });
        }
        if !in_unit_range(self.ground_albedo) {
            return Err(AtmosphereError::AlbedoOutOfRange(self.ground_albedo));
        }

        for (layer, medium) in self.layers.iter().enumerate() {
            if !non_negative(medium.scattering) {
                return Err(AtmosphereError::NegativeCoefficient {
                    layer,
                    field: "scattering",
                });
            }
            if !non_negative(medium.absorption) {
                return Err(AtmosphereError::NegativeCoefficient {
                    layer,
                    field: "absorption",
                });
            }
            match medium.density_profile {
                DensityProfile::Exponential { scale_height }
                    if !(scale_height.is_finite() && scale_height > 0.0) =>
                {
                    return Err(AtmosphereError::InvalidDensityProfile { layer });
                }
                DensityProfile::Tent { layer_width, .. }
                    if layer_width.is_nan() || layer_width < 0.0 =>
                {
                    return Err(AtmosphereError::InvalidDensityProfile { layer });
                }
                _ => {}
            }
            let phase_ok = match medium.phase_function {
                PhaseFunction::Rayleigh => true,
                PhaseFunction::HenyeyGreenstein(g) | PhaseFunction::CornetteShanks(g) => {
                    valid_asymmetry(g)
                }
                PhaseFunction::DualLobe(g1, g2, w) => {
                    valid_asymmetry(g1) && valid_asymmetry(g2) && (0.0..=1.0).contains(&w)
                }
            };
            if !phase_ok {
                return Err(AtmosphereError::InvalidPhaseFunction { layer });
            }
        }

        Ok(())
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::EARTH
    }
}

fn non_negative(v: Vec3) -> bool {
    v.is_finite() && v.cmpge(Vec3::ZERO).all()
}

/// `|g| = 1` collapses the lobe into a singular spike.
fn valid_asymmetry(g: f32) -> bool {
    g.abs() < 1.0
}

fn in_unit_range(v: Vec3) -> bool {
    non_negative(v) && v.cmple(Vec3::ONE).all()
}

/// Medium coefficients at one point of the atmosphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereSample {
    /// Scattering coefficient of each layer.
    pub scattering: [Vec3; LAYER_COUNT],
    /// Total extinction (scattering + absorption of all layers).
    pub extinction: Vec3,
}

impl AtmosphereSample {
    /// Sum of the scattering coefficients of every layer.
    pub fn total_scattering(&self) -> Vec3 {
        self.scattering.iter().copied().sum()
    }

    /// Scattering weighted by each layer's phase function at `nu`.
    pub fn phase_weighted_scattering(&self, atmosphere: &Atmosphere, nu: f32) -> Vec3 {
        self.scattering
            .iter()
            .zip(&atmosphere.layers)
            .map(|(scattering, layer)| *scattering * layer.phase_function.eval(nu))
            .sum()
    }
}

/// Physically invalid atmosphere parameters.
#[derive(Debug, Error, PartialEq)]
pub enum AtmosphereError {
    /// The planet radius is not a positive finite number.
    #[error("bottom radius must be positive and finite, got {0}")]
    InvalidBottomRadius(f32),

    /// The atmosphere shell is empty or inverted.
    #[error("top radius ({top}) must be greater than bottom radius ({bottom})")]
    TopBelowBottom { bottom: f32, top: f32 },

    /// Ground albedo outside `[0, 1]`.
    #[error("ground albedo must be within [0, 1], got {0}")]
    AlbedoOutOfRange(Vec3),

    /// A scattering or absorption coefficient is negative or non-finite.
    #[error("layer {layer} has a negative or non-finite {field} coefficient")]
    NegativeCoefficient { layer: usize, field: &'static str },

    /// Non-positive scale height or negative tent width.
    #[error("layer {layer} has an invalid density profile")]
    InvalidDensityProfile { layer: usize },

    /// Asymmetry outside `(-1, 1)` or a dual-lobe weight outside `[0, 1]`.
    #[error("layer {layer} has an invalid phase function")]
    InvalidPhaseFunction { layer: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(Atmosphere::EARTH.validate(), Ok(()));
        assert_eq!(Atmosphere::MARS.validate(), Ok(()));
        assert_eq!(Atmosphere::default(), Atmosphere::EARTH);
    }

    #[test]
    fn test_density_multiplier_scales_all_layers() {
        let thick = Atmosphere::EARTH.with_density_multiplier(2.0);
        for (a, b) in thick.layers.iter().zip(&Atmosphere::EARTH.layers) {
            assert_eq!(a.scattering, b.scattering * 2.0);
            assert_eq!(a.absorption, b.absorption * 2.0);
        }
    }

    #[test]
    fn test_length_scale_preserves_optical_thickness() {
        let km = Atmosphere::EARTH.with_length_scale(1e-3);
        assert!((km.bottom_radius - 6360.0).abs() < 1e-3);
        let m_sample = Atmosphere::EARTH.sample(Atmosphere::EARTH.bottom_radius + 2_000.0);
        let km_sample = km.sample(km.bottom_radius + 2.0);
        // coefficient per km is 1000x the coefficient per m
        let ratio = km_sample.extinction / m_sample.extinction;
        assert!((ratio - Vec3::splat(1000.0)).abs().max_element() < 1.0, "{ratio}");
    }

    #[test]
    fn test_sample_at_ground_matches_coefficients() {
        let atmosphere = Atmosphere::EARTH;
        let sample = atmosphere.sample(atmosphere.bottom_radius);
        assert_eq!(sample.scattering[0], atmosphere.layers[0].scattering);
        assert_eq!(sample.scattering[1], atmosphere.layers[1].scattering);
        // ozone is zero at the ground
        let expected = atmosphere.layers[0].extinction() + atmosphere.layers[1].extinction();
        assert!((sample.extinction - expected).abs().max_element() < 1e-12);
    }

    #[test]
    fn test_sample_clamps_outside_shell() {
        let atmosphere = Atmosphere::EARTH;
        assert_eq!(
            atmosphere.sample(atmosphere.bottom_radius - 10.0),
            atmosphere.sample(atmosphere.bottom_radius)
        );
        assert_eq!(
            atmosphere.sample(atmosphere.top_radius + 10.0),
            atmosphere.sample(atmosphere.top_radius)
        );
    }

    #[test]
    fn test_density_decreases_with_altitude() {
        let atmosphere = Atmosphere::EARTH;
        let low = atmosphere.sample(atmosphere.bottom_radius + 1_000.0);
        let high = atmosphere.sample(atmosphere.bottom_radius + 20_000.0);
        assert!(high.total_scattering().cmplt(low.total_scattering()).all());
    }

    #[test]
    fn test_phase_weighted_scattering_isotropic_limit() {
        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.layers[0].phase_function = PhaseFunction::HenyeyGreenstein(0.0);
        atmosphere.layers[1].phase_function = PhaseFunction::HenyeyGreenstein(0.0);
        let sample = atmosphere.sample(atmosphere.bottom_radius);
        let weighted = sample.phase_weighted_scattering(&atmosphere, 0.3);
        let expected = sample.total_scattering() / (4.0 * std::f32::consts::PI);
        assert!((weighted - expected).abs().max_element() < 1e-10);
    }

    #[test]
    fn test_validate_rejects_inverted_shell() {
        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.top_radius = atmosphere.bottom_radius;
        assert!(matches!(
            atmosphere.validate(),
            Err(AtmosphereError::TopBelowBottom { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_coefficient() {
        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.layers[1].absorption = Vec3::new(0.0, -1e-6, 0.0);
        assert_eq!(
            atmosphere.validate(),
            Err(AtmosphereError::NegativeCoefficient {
                layer: 1,
                field: "absorption"
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_albedo_and_profile() {
        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.ground_albedo = Vec3::new(0.5, 1.5, 0.5);
        assert!(matches!(
            atmosphere.validate(),
            Err(AtmosphereError::AlbedoOutOfRange(_))
        ));

        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.layers[0].density_profile = DensityProfile::Exponential { scale_height: 0.0 };
        assert_eq!(
            atmosphere.validate(),
            Err(AtmosphereError::InvalidDensityProfile { layer: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_bad_phase_function() {
        for phase in [
            PhaseFunction::HenyeyGreenstein(1.0),
            PhaseFunction::CornetteShanks(-1.2),
            PhaseFunction::HenyeyGreenstein(f32::NAN),
            PhaseFunction::DualLobe(0.8, -0.3, 1.5),
            PhaseFunction::DualLobe(0.8, -1.0, 0.5),
        ] {
            let mut atmosphere = Atmosphere::EARTH;
            atmosphere.layers[1].phase_function = phase;
            assert_eq!(
                atmosphere.validate(),
                Err(AtmosphereError::InvalidPhaseFunction { layer: 1 }),
                "{phase:?}"
            );
        }

        let mut atmosphere = Atmosphere::EARTH;
        atmosphere.layers[1].phase_function = PhaseFunction::DualLobe(0.99, -0.5, 0.0);
        assert_eq!(atmosphere.validate(), Ok(()));
    }

    #[test]
    fn test_earth_preset_defaults() {
        assert_eq!(Atmosphere::EARTH.ground_albedo, Vec3::ZERO);
        assert_eq!(
            Atmosphere::EARTH.layers[1].phase_function,
            PhaseFunction::CornetteShanks(0.8)
        );
    }

    #[test]
    fn test_ron_roundtrip() {
        let ron_str = ron::to_string(&Atmosphere::MARS).unwrap();
        let parsed: Atmosphere = ron::from_str(&ron_str).unwrap();
        assert_eq!(parsed, Atmosphere::MARS);
    }
}
