//! Single-direction ray march accumulating second-order radiance and the
//! multiscattering transfer factor.

use std::f32::consts::PI;

use aether_atmosphere::{
    Atmosphere, AtmosphereSample, TransmittanceSampler, local_r, local_up,
    max_atmosphere_distance, ray_intersects_ground,
};
use glam::Vec3;

const FRAC_1_4_PI: f32 = 1.0 / (4.0 * PI);

/// Result of marching one sampled direction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MultiscatteringSample {
    /// Second-order in-scattered radiance, including the ground bounce.
    pub l_2: Vec3,
    /// Fraction of light redistributed by one more isotropic scattering event.
    pub f_ms: Vec3,
}

impl std::ops::Add for MultiscatteringSample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            l_2: self.l_2 + rhs.l_2,
            f_ms: self.f_ms + rhs.f_ms,
        }
    }
}

impl std::ops::Mul<f32> for MultiscatteringSample {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            l_2: self.l_2 * rhs,
            f_ms: self.f_ms * rhs,
        }
    }
}

impl std::iter::Sum for MultiscatteringSample {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, s| acc + s)
    }
}

/// State at the midpoint of one march segment.
#[derive(Clone, Copy, Debug)]
pub struct RayMarchSample {
    /// Distance from the ray origin to the segment midpoint.
    pub t: f32,
    /// Segment length.
    pub dt: f32,
    /// Distance from the planet center at the midpoint.
    pub local_r: f32,
    /// Medium coefficients at the midpoint.
    pub medium: AtmosphereSample,
    /// Optical depth from the origin through the end of this segment.
    pub optical_depth: Vec3,
    /// `exp(-optical_depth)`.
    pub transmittance: Vec3,
}

/// Midpoint march along a ray in the `(r, mu)` frame, split into equal segments.
#[derive(Clone, Debug)]
pub struct RayMarch<'a> {
    atmosphere: &'a Atmosphere,
    r: f32,
    mu: f32,
    dt: f32,
    steps: u32,
    step: u32,
    optical_depth: Vec3,
}

impl<'a> RayMarch<'a> {
    /// March `length` units from `(r, mu)` in `steps` segments.
    pub fn new(atmosphere: &'a Atmosphere, r: f32, mu: f32, length: f32, steps: u32) -> Self {
        Self {
            atmosphere,
            r,
            mu,
            dt: length / steps.max(1) as f32,
            steps,
            step: 0,
            optical_depth: Vec3::ZERO,
        }
    }

    /// Optical depth accumulated over the segments visited so far.
    pub fn optical_depth(&self) -> Vec3 {
        self.optical_depth
    }
}

impl Iterator for RayMarch<'_> {
    type Item = RayMarchSample;

    fn next(&mut self) -> Option<RayMarchSample> {
        if self.step >= self.steps {
            return None;
        }

        let t = self.dt * (self.step as f32 + 0.5);
        let r = local_r(self.r, self.mu, t);
        let medium = self.atmosphere.sample(r);
        self.optical_depth += medium.extinction * self.dt;
        self.step += 1;

        Some(RayMarchSample {
            t,
            dt: self.dt,
            local_r: r,
            medium,
            optical_depth: self.optical_depth,
            transmittance: (-self.optical_depth).exp(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps - self.step) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RayMarch<'_> {}

/// Transmittance toward the light, zero when the planet blocks it.
fn light_transmittance<T>(atmosphere: &Atmosphere, transmittance: &T, r: f32, mu_light: f32) -> Vec3
where
    T: TransmittanceSampler + ?Sized,
{
    if ray_intersects_ground(atmosphere, r, mu_light) {
        Vec3::ZERO
    } else {
        transmittance.sample(r, mu_light)
    }
}

/// Light reflected off the ground at the end of a ray that hits the planet.
///
/// `transmittance_to_ground` is the attenuation accumulated along the whole
/// ray and `ground_up` the surface normal at the hit point.
pub fn ground_bounce<T>(
    atmosphere: &Atmosphere,
    transmittance: &T,
    transmittance_to_ground: Vec3,
    ground_up: Vec3,
    light_dir: Vec3,
) -> Vec3
where
    T: TransmittanceSampler + ?Sized,
{
    let mu_light = light_dir.dot(ground_up);
    let to_light = light_transmittance(atmosphere, transmittance, atmosphere.bottom_radius, mu_light);
    transmittance_to_ground * to_light * mu_light.max(0.0) * atmosphere.ground_albedo
}

/// March one sampled direction from altitude `r`.
///
/// `ray_dir` and `light_dir` are unit vectors in the frame where local up at
/// the origin is `+Y`. The in-scattered term is weighted by each layer's
/// phase function at the ray/light angle, then normalized by `1 / 4pi` like
/// the transfer term.
pub fn sample_multiscattering_dir<T>(
    atmosphere: &Atmosphere,
    transmittance: &T,
    r: f32,
    ray_dir: Vec3,
    light_dir: Vec3,
    samples: u32,
) -> MultiscatteringSample
where
    T: TransmittanceSampler + ?Sized,
{
    let mu_view = ray_dir.y;
    let t_max = max_atmosphere_distance(atmosphere, r, mu_view);
    let nu = ray_dir.dot(light_dir);

    let mut l_2 = Vec3::ZERO;
    let mut f_ms = Vec3::ZERO;

    let mut march = RayMarch::new(atmosphere, r, mu_view, t_max, samples);
    for step in march.by_ref() {
        f_ms += step.transmittance * step.medium.total_scattering() * FRAC_1_4_PI * step.dt;

        let mu_light = light_dir.dot(local_up(r, step.t, ray_dir));
        let shadow = light_transmittance(atmosphere, transmittance, step.local_r, mu_light);
        let in_scattering = step.medium.phase_weighted_scattering(atmosphere, nu);
        l_2 += step.transmittance * shadow * in_scattering * FRAC_1_4_PI * step.dt;
    }

    if ray_intersects_ground(atmosphere, r, mu_view) {
        let transmittance_to_ground = (-march.optical_depth()).exp();
        let ground_up = local_up(r, t_max, ray_dir);
        l_2 += ground_bounce(
            atmosphere,
            transmittance,
            transmittance_to_ground,
            ground_up,
            light_dir,
        );
    }

    MultiscatteringSample { l_2, f_ms }
}
