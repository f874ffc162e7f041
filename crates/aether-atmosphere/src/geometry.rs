//! Spherical-shell geometry in the `(r, mu)` frame.
//!
//! A ray starts at distance `r` from the planet center, with local up along
//! `+Y`, and travels in a direction whose cosine with local up is `mu`.
//! Every function here returns a finite value for `mu` in `[-1, 1]` and `r`
//! inside the atmosphere shell, including exactly grazing rays.

use glam::Vec3;

use crate::atmosphere::Atmosphere;

/// Whether a ray from `(r, mu)` hits the planet surface.
pub fn ray_intersects_ground(atmosphere: &Atmosphere, r: f32, mu: f32) -> bool {
    let rb = atmosphere.bottom_radius;
    mu < 0.0 && r * r * (mu * mu - 1.0) + rb * rb >= 0.0
}

/// Distance along the ray to the top of the atmosphere.
pub fn distance_to_top_atmosphere_boundary(atmosphere: &Atmosphere, r: f32, mu: f32) -> f32 {
    let rt = atmosphere.top_radius;
    let discriminant = (r * r * (mu * mu - 1.0) + rt * rt).max(0.0);
    (-r * mu + discriminant.sqrt()).max(0.0)
}

/// Distance along the ray to the planet surface (meaningful when
/// [`ray_intersects_ground`] holds).
pub fn distance_to_bottom_atmosphere_boundary(atmosphere: &Atmosphere, r: f32, mu: f32) -> f32 {
    let rb = atmosphere.bottom_radius;
    let discriminant = (r * r * (mu * mu - 1.0) + rb * rb).max(0.0);
    (-r * mu - discriminant.sqrt()).max(0.0)
}

/// Length of the ray inside the atmosphere: up to the ground if it is hit
/// first, otherwise up to the top boundary.
pub fn max_atmosphere_distance(atmosphere: &Atmosphere, r: f32, mu: f32) -> f32 {
    if ray_intersects_ground(atmosphere, r, mu) {
        distance_to_bottom_atmosphere_boundary(atmosphere, r, mu)
    } else {
        distance_to_top_atmosphere_boundary(atmosphere, r, mu)
    }
}

/// Distance from the planet center after travelling `t` along the ray.
pub fn local_r(r: f32, mu: f32, t: f32) -> f32 {
    (t * t + 2.0 * r * mu * t + r * r).max(0.0).sqrt()
}

/// Local up vector after travelling `t` along `ray_dir` from `(0, r, 0)`.
pub fn local_up(r: f32, t: f32, ray_dir: Vec3) -> Vec3 {
    (Vec3::new(0.0, r, 0.0) + t * ray_dir).normalize()
}
