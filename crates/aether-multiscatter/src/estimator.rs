//! Per-texel multiscattering estimate and closure of the scattering series.

use aether_atmosphere::{Atmosphere, TransmittanceSampler};
use glam::Vec3;

use crate::integrator::{MultiscatteringSample, sample_multiscattering_dir};
use crate::sampler::DirectionSampler;

/// One texel of the multiscattering LUT: RGB plus an opaque alpha.
pub type LutTexel = [f32; 4];

/// Direction toward the light for a given cosine with local up.
///
/// The light lies in the Y/Z plane: `(0, mu, -sqrt(1 - mu^2))`.
pub fn light_direction(mu: f32) -> Vec3 {
    let mu = mu.clamp(-1.0, 1.0);
    Vec3::new(0.0, mu, -(1.0 - mu * mu).max(0.0).sqrt())
}

/// Average [`MultiscatteringSample`] over `dirs` sampled directions.
pub fn estimate_multiscattering<T>(
    atmosphere: &Atmosphere,
    transmittance: &T,
    r: f32,
    mu: f32,
    dirs: u32,
    samples: u32,
) -> MultiscatteringSample
where
    T: TransmittanceSampler + ?Sized,
{
    let light_dir = light_direction(mu);
    let total: MultiscatteringSample = DirectionSampler::new(dirs)
        .map(|ray_dir| {
            sample_multiscattering_dir(atmosphere, transmittance, r, ray_dir, light_dir, samples)
        })
        .sum();
    total * (1.0 / dirs as f32)
}

/// Sum the infinite series `l_2 * (1 + f_ms + f_ms^2 + ...)` per channel.
///
/// Converges for `f_ms` in `[0, 1)`; values at or above 1 come from
/// physically invalid atmospheres and yield non-finite or negative results.
pub fn close_series(sample: &MultiscatteringSample) -> Vec3 {
    let transfer = 1.0 / (Vec3::ONE - sample.f_ms);
    sample.l_2 * transfer
}

/// Pack a multiscattering value into a LUT texel.
pub fn to_texel(phi_ms: Vec3) -> LutTexel {
    phi_ms.extend(1.0).to_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_direction() {
        assert!((light_direction(1.0) - Vec3::Y).length() < 1e-6);
        assert!((light_direction(0.0) - Vec3::NEG_Z).length() < 1e-6);
        for mu in [-1.0, -0.4, 0.25, 0.9] {
            let dir = light_direction(mu);
            assert!((dir.length() - 1.0).abs() < 1e-6);
            assert!((dir.dot(Vec3::Y) - mu).abs() < 1e-6);
        }
    }

    #[test]
    fn test_close_series_matches_geometric_sum() {
        let v = Vec3::new(0.2, 0.5, 1.0);
        for k in [0.0_f32, 0.1, 0.5, 0.9] {
            let sample = MultiscatteringSample {
                l_2: v,
                f_ms: Vec3::splat(k),
            };
            let expected = v / (1.0 - k);
            assert!(
                (close_series(&sample) - expected).abs().max_element() < 1e-5,
                "k = {k}"
            );
        }
    }

    #[test]
    fn test_close_series_per_channel() {
        let sample = MultiscatteringSample {
            l_2: Vec3::ONE,
            f_ms: Vec3::new(0.0, 0.5, 0.75),
        };
        let phi = close_series(&sample);
        assert!((phi - Vec3::new(1.0, 2.0, 4.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_texel_alpha_is_opaque() {
        assert_eq!(to_texel(Vec3::new(0.1, 0.2, 0.3)), [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_vacuum_contributes_nothing() {
        let mut atmosphere = Atmosphere::EARTH.with_length_scale(1e-3);
        for layer in atmosphere.layers.iter_mut() {
            *layer = aether_atmosphere::Medium::EMPTY;
        }
        atmosphere.ground_albedo = Vec3::ZERO;
        let transmittance = |_r: f32, _mu: f32| Vec3::ONE;
        let sample =
            estimate_multiscattering(&atmosphere, &transmittance, atmosphere.bottom_radius, 0.5, 16, 8);
        assert_eq!(sample, MultiscatteringSample::default());
    }

    fn rayleigh_only(albedo: f32) -> Atmosphere {
        let mut atmosphere = Atmosphere::EARTH.with_length_scale(1e-3);
        atmosphere.layers[1] = aether_atmosphere::Medium::EMPTY;
        atmosphere.layers[2] = aether_atmosphere::Medium::EMPTY;
        atmosphere.ground_albedo = Vec3::splat(albedo);
        atmosphere
    }

    /// Single-scattered radiance toward the zenith with the sun overhead.
    fn zenith_single_scattering(atmosphere: &Atmosphere, samples: u32) -> Vec3 {
        let r = atmosphere.bottom_radius;
        let length = aether_atmosphere::max_atmosphere_distance(atmosphere, r, 1.0);
        crate::integrator::RayMarch::new(atmosphere, r, 1.0, length, samples)
            .map(|step| {
                let shadow = aether_atmosphere::march_to_top(atmosphere, step.local_r, 1.0, 32);
                step.transmittance
                    * shadow
                    * step.medium.phase_weighted_scattering(atmosphere, 1.0)
                    * step.dt
            })
            .sum()
    }

    #[test]
    fn test_multiscattering_below_single_scattering() {
        let atmosphere = rayleigh_only(0.0);
        let transmittance =
            |r: f32, mu: f32| aether_atmosphere::march_to_top(&atmosphere, r, mu, 32);
        let sample =
            estimate_multiscattering(&atmosphere, &transmittance, atmosphere.bottom_radius, 1.0, 64, 32);
        let phi = close_series(&sample);
        let single = zenith_single_scattering(&atmosphere, 32);

        assert!(phi.cmpgt(Vec3::ZERO).all(), "{phi}");
        assert!(sample.f_ms.cmplt(Vec3::ONE).all(), "{}", sample.f_ms);
        assert!(phi.cmplt(single).all(), "phi {phi} single {single}");
    }

    #[test]
    fn test_ground_albedo_raises_estimate() {
        let lit = rayleigh_only(0.3);
        let dark = rayleigh_only(0.0);
        let transmittance = |r: f32, mu: f32| aether_atmosphere::march_to_top(&lit, r, mu, 32);
        let r = lit.bottom_radius;

        let lit_phi = close_series(&estimate_multiscattering(&lit, &transmittance, r, 0.8, 32, 16));
        let dark_phi = close_series(&estimate_multiscattering(&dark, &transmittance, r, 0.8, 32, 16));
        assert!(lit_phi.cmpgt(dark_phi).all(), "lit {lit_phi} dark {dark_phi}");
    }

    #[test]
    fn test_estimate_independent_of_direction_order() {
        let atmosphere = rayleigh_only(0.3);
        let transmittance =
            |r: f32, mu: f32| aether_atmosphere::march_to_top(&atmosphere, r, mu, 16);
        let r = atmosphere.bottom_radius + 1.5;
        let mu = 0.4;
        let dirs = 48;

        let mut directions: Vec<Vec3> = DirectionSampler::new(dirs).collect();
        directions.reverse();
        // interleave halves so the order is neither forward nor reversed
        let (head, tail) = directions.split_at(directions.len() / 2);
        let shuffled: Vec<Vec3> = tail
            .iter()
            .zip(head)
            .flat_map(|(a, b)| [*a, *b])
            .collect();
        assert_eq!(shuffled.len(), directions.len());

        let light_dir = light_direction(mu);
        let reordered: MultiscatteringSample = shuffled
            .iter()
            .map(|dir| sample_multiscattering_dir(&atmosphere, &transmittance, r, *dir, light_dir, 12))
            .sum::<MultiscatteringSample>()
            * (1.0 / dirs as f32);
        let estimate = estimate_multiscattering(&atmosphere, &transmittance, r, mu, dirs, 12);

        let close = |a: Vec3, b: Vec3| (a - b).abs().cmple(b.abs() * 1e-4 + 1e-9).all();
        assert!(close(reordered.l_2, estimate.l_2), "{} vs {}", reordered.l_2, estimate.l_2);
        assert!(close(reordered.f_ms, estimate.f_ms), "{} vs {}", reordered.f_ms, estimate.f_ms);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let atmosphere = Atmosphere::EARTH.with_length_scale(1e-3);
        let transmittance =
            |r: f32, mu: f32| aether_atmosphere::march_to_top(&atmosphere, r, mu, 16);
        let r = atmosphere.bottom_radius + 4.0;
        let a = estimate_multiscattering(&atmosphere, &transmittance, r, 0.3, 16, 8);
        let b = estimate_multiscattering(&atmosphere, &transmittance, r, 0.3, 16, 8);
        assert_eq!(a, b);
    }
}
