//! Deterministic low-discrepancy directions over the unit sphere.
//!
//! Points come from the additive R2 sequence (generalized golden ratio in
//! two dimensions) and are lifted onto the sphere with the Lambert
//! equal-area projection, so equal areas of the unit square map to equal
//! solid angles.

use std::f64::consts::TAU;

use glam::{Vec2, Vec3};

/// The plastic-number based increments of the R2 sequence.
const PHI_2: (f64, f64) = (1.324_717_957_244_746, 1.754_877_666_246_693);

/// The `n`-th point of the R2 sequence: `frac(0.5 + n * PHI_2)`.
///
/// Accumulated in `f64` so large indices keep their fractional precision.
pub fn s2_sequence(n: u32) -> Vec2 {
    let x = 0.5 + f64::from(n) * PHI_2.0;
    let y = 0.5 + f64::from(n) * PHI_2.1;
    Vec2::new((x - x.floor()) as f32, (y - y.floor()) as f32)
}

/// Lambert equal-area projection of the unit square onto the unit sphere.
///
/// `uv.x` sets the sine of latitude (`2u - 1`), `uv.y` the longitude.
pub fn uv_to_sphere(uv: Vec2) -> Vec3 {
    let phi = (TAU * f64::from(uv.y)) as f32;
    let sin_lambda = 2.0 * uv.x - 1.0;
    let cos_lambda = (1.0 - sin_lambda * sin_lambda).max(0.0).sqrt();
    Vec3::new(cos_lambda * phi.cos(), cos_lambda * phi.sin(), sin_lambda)
}

/// The `n`-th sampled direction.
pub fn sample_direction(n: u32) -> Vec3 {
    uv_to_sphere(s2_sequence(n))
}

/// Iterator over the first `count` sampled directions.
#[derive(Clone, Debug)]
pub struct DirectionSampler {
    next: u32,
    count: u32,
}

impl DirectionSampler {
    pub fn new(count: u32) -> Self {
        Self { next: 0, count }
    }
}

impl Iterator for DirectionSampler {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if self.next >= self.count {
            return None;
        }
        let dir = sample_direction(self.next);
        self.next += 1;
        Some(dir)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DirectionSampler {}
