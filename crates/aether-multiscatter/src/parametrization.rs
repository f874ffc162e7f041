//! Mapping between LUT texels and the physical `(r, mu)` state they store.

use aether_atmosphere::Atmosphere;
use glam::{UVec2, Vec2};

/// Bijection between grid cells and `(r, mu)` pairs.
///
/// `r` is the distance from the planet center, `mu` the cosine between
/// local up and the light. Implementations are shared by every worker of a
/// pass, hence `Sync`.
pub trait Parametrization: Sync {
    /// Physical state stored at texel `(x, y)` of a grid of `size`.
    fn decode(&self, x: u32, y: u32, size: UVec2) -> (f32, f32);

    /// Texture coordinate in `[0, 1]^2` at which `(r, mu)` is stored.
    fn encode(&self, r: f32, mu: f32, size: UVec2) -> Vec2;
}

/// Texel index to `[0, 1]`, placing the first and last texel centres on the
/// range limits.
fn texel_to_unit(i: u32, n: u32) -> f32 {
    if n <= 1 {
        0.5
    } else {
        i as f32 / (n - 1) as f32
    }
}

/// Inverse of [`texel_to_unit`] expressed as a texture coordinate.
fn unit_to_uv(unit: f32, n: u32) -> f32 {
    if n <= 1 {
        return 0.5;
    }
    let n = n as f32;
    (unit.clamp(0.0, 1.0) * (n - 1.0) + 0.5) / n
}

/// Rows map linearly to altitude, columns linearly to `mu` in `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearParametrization {
    pub bottom_radius: f32,
    pub top_radius: f32,
}

impl LinearParametrization {
    pub fn for_atmosphere(atmosphere: &Atmosphere) -> Self {
        Self {
            bottom_radius: atmosphere.bottom_radius,
            top_radius: atmosphere.top_radius,
        }
    }
}

impl Parametrization for LinearParametrization {
    fn decode(&self, x: u32, y: u32, size: UVec2) -> (f32, f32) {
        let u = texel_to_unit(x, size.x);
        let v = texel_to_unit(y, size.y);
        let r = self.bottom_radius + (self.top_radius - self.bottom_radius) * v;
        let mu = 2.0 * u - 1.0;
        (r, mu)
    }

    fn encode(&self, r: f32, mu: f32, size: UVec2) -> Vec2 {
        let u = (mu + 1.0) * 0.5;
        let v = (r - self.bottom_radius) / (self.top_radius - self.bottom_radius);
        Vec2::new(unit_to_uv(u, size.x), unit_to_uv(v, size.y))
    }
}
