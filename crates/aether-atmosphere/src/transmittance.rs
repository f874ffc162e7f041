//! Transmittance from a point in the atmosphere to the top boundary.
//!
//! The multiscattering pass only depends on [`TransmittanceSampler`]; the
//! baked [`TransmittanceLut`] is one provider of it, closures are another.

use glam::{UVec2, Vec3};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::atmosphere::Atmosphere;
use crate::geometry::{distance_to_top_atmosphere_boundary, local_r};

/// Read-only lookup of transmittance toward the top of the atmosphere.
///
/// `r` is the distance from the planet center and `mu` the cosine between
/// local up and the direction toward the light. Implementations are shared
/// by every worker of a pass and must not hold mutable state.
pub trait TransmittanceSampler: Sync {
    /// Fraction of light (RGB, each in `[0, 1]`) that survives the path.
    fn sample(&self, r: f32, mu: f32) -> Vec3;
}

impl<F> TransmittanceSampler for F
where
    F: Fn(f32, f32) -> Vec3 + Sync,
{
    fn sample(&self, r: f32, mu: f32) -> Vec3 {
        self(r, mu)
    }
}

/// Errors from baking a transmittance table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransmittanceError {
    /// Table width or height is zero.
    #[error("transmittance table dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Zero integration steps.
    #[error("transmittance table needs at least one sample per ray")]
    ZeroSamples,
}

/// Baked transmittance table for rays that stay above the horizon.
///
/// x indexes the altitude through `rho = sqrt(r^2 - bottom^2)`, y the view
/// cosine through the distance to the top boundary, normalized between the
/// zenith and the horizon ray. Both axes concentrate texels where
/// transmittance changes fastest: near the ground and near the horizon.
#[derive(Clone, Debug, Serialize)]
pub struct TransmittanceLut {
    /// Table dimensions in texels.
    pub size: UVec2,
    /// Row-major texels.
    pub data: Vec<Vec3>,
    bottom_radius: f32,
    top_radius: f32,
}

impl TransmittanceLut {
    /// Integrate extinction for every texel, in parallel.
    ///
    /// Texel `(x, y)` holds the transmittance from the `(r, mu)` that
    /// [`Self::texel_to_r_mu`] gives for it to the top boundary. Rays through
    /// the planet are not stored; callers test
    /// [`crate::ray_intersects_ground`] before sampling.
    pub fn bake(
        atmosphere: &Atmosphere,
        size: UVec2,
        samples: u32,
    ) -> Result<Self, TransmittanceError> {
        if size.x == 0 || size.y == 0 {
            return Err(TransmittanceError::ZeroDimensions {
                width: size.x,
                height: size.y,
            });
        }
        if samples == 0 {
            return Err(TransmittanceError::ZeroSamples);
        }

        let mut lut = Self {
            size,
            data: Vec::new(),
            bottom_radius: atmosphere.bottom_radius,
            top_radius: atmosphere.top_radius,
        };

        let start = std::time::Instant::now();
        let total = size.x as usize * size.y as usize;
        lut.data = (0..total)
            .into_par_iter()
            .map(|i| {
                let x = (i % size.x as usize) as u32;
                let y = (i / size.x as usize) as u32;
                let (r, mu) = lut.texel_to_r_mu(x, y);
                march_to_top(atmosphere, r, mu, samples)
            })
            .collect();

        info!(
            "Baked {}x{} transmittance table ({} samples) in {:.2}ms",
            size.x,
            size.y,
            samples,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(lut)
    }

    /// Length of the ray from the top boundary grazing the ground.
    fn horizon_length(&self) -> f32 {
        ((self.top_radius - self.bottom_radius) * (self.top_radius + self.bottom_radius)).sqrt()
    }

    /// `(r, mu)` stored at texel `(x, y)`.
    pub fn texel_to_r_mu(&self, x: u32, y: u32) -> (f32, f32) {
        let h = self.horizon_length();
        let rho = h * unit(x, self.size.x);
        let r = (rho * rho + self.bottom_radius * self.bottom_radius).sqrt();

        let d_min = self.top_radius - r;
        let d_max = rho + h;
        let d = d_min + unit(y, self.size.y) * (d_max - d_min);
        let mu = if d <= 0.0 {
            1.0
        } else {
            (h * h - rho * rho - d * d) / (2.0 * r * d)
        };
        (r, mu.clamp(-1.0, 1.0))
    }

    /// Normalized table coordinates of `(r, mu)`, clamped to the table.
    fn r_mu_to_unit(&self, r: f32, mu: f32) -> (f32, f32) {
        let h = self.horizon_length();
        let r = r.clamp(self.bottom_radius, self.top_radius);
        let rho = ((r - self.bottom_radius) * (r + self.bottom_radius)).max(0.0).sqrt();

        let mu = mu.clamp(-1.0, 1.0);
        let discriminant =
            ((self.top_radius - r) * (self.top_radius + r) + r * r * mu * mu).max(0.0);
        let d = (-r * mu + discriminant.sqrt()).max(0.0);
        let d_min = self.top_radius - r;
        let d_max = rho + h;
        let x_mu = if d_max > d_min {
            (d - d_min) / (d_max - d_min)
        } else {
            0.0
        };
        ((rho / h).clamp(0.0, 1.0), x_mu.clamp(0.0, 1.0))
    }

    fn texel(&self, x: u32, y: u32) -> Vec3 {
        self.data[(y * self.size.x + x) as usize]
    }
}

impl TransmittanceSampler for TransmittanceLut {
    /// Bilinear lookup; rays below the horizon read the horizon texel.
    fn sample(&self, r: f32, mu: f32) -> Vec3 {
        let (u, v) = self.r_mu_to_unit(r, mu);

        let fx = u * (self.size.x - 1) as f32;
        let fy = v * (self.size.y - 1) as f32;
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.size.x - 1);
        let y1 = (y0 + 1).min(self.size.y - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let bottom = self.texel(x0, y0).lerp(self.texel(x1, y0), tx);
        let top = self.texel(x0, y1).lerp(self.texel(x1, y1), tx);
        bottom.lerp(top, ty)
    }
}

/// Transmittance from `(r, mu)` to the top boundary by midpoint integration.
pub fn march_to_top(atmosphere: &Atmosphere, r: f32, mu: f32, samples: u32) -> Vec3 {
    let length = distance_to_top_atmosphere_boundary(atmosphere, r, mu);
    let dt = length / samples as f32;
    let optical_depth: Vec3 = (0..samples)
        .map(|i| {
            let t = (i as f32 + 0.5) * dt;
            atmosphere.sample(local_r(r, mu, t)).extinction * dt
        })
        .sum();
    (-optical_depth).exp()
}

fn unit(i: u32, n: u32) -> f32 {
    if n > 1 {
        i as f32 / (n - 1) as f32
    } else {
        0.5
    }
}
